use shipquote_core::ServiceLevel;
use shipquote_engine::RateCard;

pub(crate) fn render_rates(card: &RateCard) -> String {
    let table = &card.table;
    let mut lines = vec![format!("{:<14}{:>10}{:>10}", "GRAMS", "PAC", "SEDEX")];
    lines.extend(table.bands().iter().map(|band| {
        format!(
            "{:<14}{:>10}{:>10}",
            format!("{}-{}", band.min_grams, band.max_grams),
            format!("{:.2}", band.economy_price),
            format!("{:.2}", band.express_price)
        )
    }));
    lines.push(String::new());
    lines.push(format!(
        "Above {} g: +R$ {:.2} per 100 g",
        table.ceiling_grams(),
        table.surcharge_per_100g()
    ));
    lines.push(format!(
        "Lead time: PAC {} day(s), SEDEX {} day(s)",
        table.lead_time_days(ServiceLevel::Economy),
        table.lead_time_days(ServiceLevel::Express)
    ));

    if let Some(regional) = &card.regional {
        lines.push(String::new());
        lines.push(format!("Regional multipliers from {}:", regional.origin_state));
        lines.extend(
            regional
                .zones
                .iter()
                .map(|zone| format!("  {:<24} x{}", zone.states.join(", "), zone.multiplier)),
        );
        lines.push(format!(
            "  {:<24} x{}",
            "other states", regional.default_multiplier
        ));
    }

    let mut out = lines.join("\n");
    out.push('\n');
    out
}
