use crate::data::business::SearchResponse;
use comfy_table::{Attribute, Cell, ContentArrangement, Table};
use crossterm::style::Stylize;

const DISPLAY_HEADERS: [&str; 7] = ["#", "Name", "Phone", "Email", "Address", "Rating", "Reviews"];

/// Build the plain-text results table printed by one-shot searches
pub fn build_results_table(response: &SearchResponse) -> Table {
    let mut table = Table::new();
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(
        DISPLAY_HEADERS
            .iter()
            .map(|h| Cell::new(h).add_attribute(Attribute::Bold))
            .collect::<Vec<_>>(),
    );

    for (i, business) in response.businesses.iter().enumerate() {
        table.add_row(vec![
            (i + 1).to_string(),
            business.name.clone(),
            business.phone.clone().unwrap_or_default(),
            business.email.clone().unwrap_or_default(),
            business.address.clone().unwrap_or_default(),
            business.rating.map(|r| format!("{:.1}", r)).unwrap_or_default(),
            business
                .reviews_count
                .map(|c| c.to_string())
                .unwrap_or_default(),
        ]);
    }

    table
}

pub fn display_results(response: &SearchResponse) {
    if response.businesses.is_empty() {
        println!(
            "{}",
            "No businesses found. Try a different search.".yellow()
        );
        return;
    }

    println!("{}", response.query.clone().cyan());
    println!("{}", build_results_table(response));
    println!(
        "\n{}",
        format!("{} results", response.total_results).green()
    );
}
