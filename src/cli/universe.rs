use super::ui;
use crate::core::universe::Universe;
use comfy_table::Cell;

pub fn run(universe: &Universe) {
    println!("{}", render(universe));
}

fn render(universe: &Universe) -> String {
    let mut table = ui::new_styled_table();
    table.set_header(vec![
        ui::header_cell("Category"),
        ui::header_cell("Funds"),
        ui::header_cell("Count"),
    ]);
    for category in &universe.categories {
        table.add_row(vec![
            Cell::new(&category.name),
            Cell::new(category.funds.join(", ")),
            ui::number_cell(category.funds.len().to_string()),
        ]);
    }

    format!(
        "{}\n{}\n{} unique funds",
        ui::style_text("Fund universe", ui::StyleType::Title),
        table,
        ui::style_text(
            &universe.funds().len().to_string(),
            ui::StyleType::TotalValue
        )
    )
}
