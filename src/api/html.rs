// Row extraction for the op.gg page layout. Selector drift upstream shows up
// as empty or percent-less rows, which the validation gate catches.

use scraper::{ElementRef, Html, Selector};

use super::models::CounterRow;
use crate::error::AppError;

const ROW_SELECTOR: &str = "ul > li";
const NAME_SELECTOR: &str = "div:nth-child(2) > span";
const WIN_RATE_SELECTOR: &str = "div:nth-child(3) > strong";
const GAMES_SELECTOR: &str = "div:nth-child(4) > span";
const CHAMPION_NAME_SELECTOR: &str = "span.truncate";

fn selector(css: &str) -> Result<Selector, AppError> {
    Selector::parse(css).map_err(|e| AppError::ParseError(format!("Invalid selector '{}': {:?}", css, e)))
}

// Concatenated, trimmed text of every descendant matching `sel`.
fn child_text(element: &ElementRef, sel: &Selector) -> String {
    element
        .select(sel)
        .flat_map(|child| child.text())
        .collect::<String>()
        .trim()
        .to_string()
}

pub fn parse_counter_rows(body: &str) -> Result<Vec<CounterRow>, AppError> {
    let document = Html::parse_document(body);
    let rows = selector(ROW_SELECTOR)?;
    let name = selector(NAME_SELECTOR)?;
    let win_rate = selector(WIN_RATE_SELECTOR)?;
    let games = selector(GAMES_SELECTOR)?;

    Ok(document
        .select(&rows)
        .map(|li| CounterRow {
            name: child_text(&li, &name),
            win_rate: child_text(&li, &win_rate),
            games_played: child_text(&li, &games),
        })
        .collect())
}

pub fn parse_champion_names(body: &str) -> Result<Vec<String>, AppError> {
    let document = Html::parse_document(body);
    let names = selector(CHAMPION_NAME_SELECTOR)?;

    Ok(document
        .select(&names)
        .map(|span| span.text().collect::<String>().trim().to_string())
        .filter(|name| !name.is_empty())
        .collect())
}
