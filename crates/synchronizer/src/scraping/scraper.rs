use std::collections::HashMap;
use std::time::Duration;

use lazy_static::lazy_static;
use regex::Regex;
use scraper::{ElementRef, Html, Selector};
use tokio::sync::RwLock;
use tracing::debug;

use super::{BestlistColumn, BestlistTable, ScrapeConfig};
use crate::error::{Result, SyncError};
use crate::traits::Scraper;

pub const DEFAULT_BESTLIST_URL: &str = "https://alabus.swiss-athletics.ch/satweb/faces/bestlist.xhtml";

const ATHLETE_KEY: &str = "con";
const CLUB_KEY: &str = "acc";
const EVENT_KEY: &str = "evt";

const TOOLTIP_CLASS: &str = "ui-tooltip";

const FORM_ID: &str = "form_anonym";
const BESTLIST_TYPE_FIELD: &str = "form_anonym:bestlistType_input";
const ALL_RESULTS_LABEL: &str = "Alle Resultate";
const EXCLUSIVE_FIELD: &str = "form_anonym:categoryExclusive_input";
// the page only offers the exclusive toggle once a junior category is selected
const YEAR_FIELD: &str = "form_anonym:bestlistYear_input";
const EXCLUSIVE_YEAR_LABEL: &str = "2023";
const CATEGORY_FIELD: &str = "form_anonym:bestlistCategory_input";
const EXCLUSIVE_CATEGORY_LABEL: &str = "U10 Männer";

lazy_static! {
    static ref CODE_LINK: Regex = Regex::new(r"openURLForBestlist\('(.*?)'\)").unwrap();
}

/// Reads bestlists from the public bestlist page.
///
/// The page keeps its list settings in a server-side session, so the client carries cookies
/// and [`Scraper::prepare_session`] swaps in a freshly configured one.
pub struct HttpScraper {
    base_url: String,
    timeout: Duration,
    client: RwLock<reqwest::Client>,
}

impl HttpScraper {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self> {
        Ok(Self {
            base_url: base_url.into(),
            timeout,
            client: RwLock::new(build_client(timeout)?),
        })
    }

    async fn fetch_page(&self, query: &[(&'static str, String)]) -> Result<String> {
        let client = self.client.read().await.clone();
        let response = client
            .get(&self.base_url)
            .query(query)
            .send()
            .await?
            .error_for_status()?;

        Ok(response.text().await?)
    }
}

fn build_client(timeout: Duration) -> Result<reqwest::Client> {
    Ok(reqwest::Client::builder()
        .user_agent("Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7)")
        .cookie_store(true)
        .timeout(timeout)
        .build()?)
}

#[async_trait::async_trait]
impl Scraper for HttpScraper {
    async fn extract_data(&self, config: &ScrapeConfig) -> Result<Option<BestlistTable>> {
        let query = config.query_arguments()?;
        debug!("Fetching bestlist {}", config);

        let page = self.fetch_page(&query).await?;
        parse_bestlist_page(&page)
    }

    async fn prepare_session(&self, exclusive_categories: bool) -> Result<()> {
        let client = build_client(self.timeout)?;
        let page = client
            .get(&self.base_url)
            .send()
            .await?
            .error_for_status()?
            .text()
            .await?;

        let form = session_form(&page, exclusive_categories)?;
        client
            .post(form.target(&self.base_url)?)
            .form(&form.fields)
            .send()
            .await?
            .error_for_status()?;

        debug!(
            "Prepared bestlist session, exclusive categories: {}",
            exclusive_categories
        );
        *self.client.write().await = client;
        Ok(())
    }

    async fn available_years(&self) -> Result<Vec<i32>> {
        let page = self.fetch_page(&[]).await?;
        parse_available_years(&page)
    }
}

/// Submission of the bestlist settings form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionForm {
    pub action: Option<String>,
    pub fields: Vec<(String, String)>,
}

impl SessionForm {
    /// Where the form posts to, resolved against the page it came from.
    pub fn target(&self, page_url: &str) -> Result<url::Url> {
        let page_url = url::Url::parse(page_url)
            .map_err(|e| SyncError::ConfigError(format!("Invalid bestlist URL {page_url}: {e}")))?;
        match self.action.as_deref() {
            Some(action) => page_url.join(action).map_err(|e| {
                SyncError::ScrapeError(format!("Invalid form action {action}: {e}"))
            }),
            None => Ok(page_url),
        }
    }

    pub fn value(&self, name: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(field, _)| field == name)
            .map(|(_, value)| value.as_str())
    }

    fn set(&mut self, name: &str, value: String) {
        match self.fields.iter_mut().find(|(field, _)| field == name) {
            Some(field) => field.1 = value,
            None => self.fields.push((name.to_string(), value)),
        }
    }
}

/// Reads the settings form of a bestlist page and selects "all results" instead of the best
/// result per athlete. With `exclusive_categories` the exclusive category toggle is ticked too.
///
/// Every other field keeps its current value, including the view state the page expects back.
pub fn session_form(page: &str, exclusive_categories: bool) -> Result<SessionForm> {
    let document = Html::parse_document(page);
    let form_selector = selector(&format!(r#"form[id="{FORM_ID}"]"#))?;
    let input_selector = selector("input[name]")?;
    let select_selector = selector("select[name]")?;
    let option_selector = selector("option")?;

    let form = document
        .select(&form_selector)
        .next()
        .ok_or_else(|| SyncError::ScrapeError(format!("Bestlist page has no {FORM_ID} form")))?;

    let mut fields = Vec::new();
    for input in form.select(&input_selector) {
        let element = input.value();
        let kind = element.attr("type").unwrap_or("text");
        let unchecked = matches!(kind, "checkbox" | "radio") && element.attr("checked").is_none();
        if unchecked || matches!(kind, "submit" | "button" | "image") {
            continue;
        }
        if let Some(name) = element.attr("name") {
            fields.push((
                name.to_string(),
                element.attr("value").unwrap_or_default().to_string(),
            ));
        }
    }

    // label -> value of every option, per select
    let mut options: HashMap<String, Vec<(String, String)>> = HashMap::new();
    for select in form.select(&select_selector) {
        let Some(name) = select.value().attr("name") else {
            continue;
        };
        let choices: Vec<(String, String, bool)> = select
            .select(&option_selector)
            .map(|option| {
                let value = option.value().attr("value").unwrap_or_default().to_string();
                let selected = option.value().attr("selected").is_some();
                (visible_text(option), value, selected)
            })
            .collect();
        let current = choices
            .iter()
            .find(|(_, _, selected)| *selected)
            .or_else(|| choices.first())
            .map(|(_, value, _)| value.clone())
            .unwrap_or_default();
        fields.push((name.to_string(), current));
        options.insert(
            name.to_string(),
            choices.into_iter().map(|(label, value, _)| (label, value)).collect(),
        );
    }

    let mut form = SessionForm {
        action: form.value().attr("action").map(str::to_string),
        fields,
    };
    let choose = |form: &mut SessionForm, field: &str, label: &str| -> Result<()> {
        let value = options
            .get(field)
            .and_then(|choices| choices.iter().find(|(text, _)| text == label))
            .map(|(_, value)| value.clone())
            .ok_or_else(|| {
                SyncError::ScrapeError(format!("{field} offers no option labelled {label}"))
            })?;
        form.set(field, value);
        Ok(())
    };

    choose(&mut form, BESTLIST_TYPE_FIELD, ALL_RESULTS_LABEL)?;
    if exclusive_categories {
        choose(&mut form, YEAR_FIELD, EXCLUSIVE_YEAR_LABEL)?;
        choose(&mut form, CATEGORY_FIELD, EXCLUSIVE_CATEGORY_LABEL)?;
        form.set(EXCLUSIVE_FIELD, "on".to_string());
    }

    Ok(form)
}

fn selector(css: &str) -> Result<Selector> {
    Selector::parse(css).map_err(|e| SyncError::ScrapeError(format!("Invalid selector {css}: {e}")))
}

/// Extracts the first table of a bestlist page.
///
/// The header row is mapped onto [`BestlistColumn`]s and extended by the athlete, club and event
/// codes, which are read from the links of the respective cells. Returns `None` when the page
/// holds no results: no table, no data rows, or rows that do not match the header (the page
/// renders a single placeholder cell for empty lists).
pub fn parse_bestlist_page(page: &str) -> Result<Option<BestlistTable>> {
    let document = Html::parse_document(page);
    let table_selector = selector("table")?;
    let row_selector = selector("tr")?;
    let header_selector = selector("th")?;
    let cell_selector = selector("td")?;

    let Some(table) = document.select(&table_selector).next() else {
        return Ok(None);
    };

    let mut rows = table.select(&row_selector);
    let Some(header_row) = rows.next() else {
        return Ok(None);
    };

    let mut headers = Vec::new();
    for header in header_row.select(&header_selector) {
        let name = visible_text(header);
        let column = BestlistColumn::from_header(&name).ok_or_else(|| {
            SyncError::ScrapeError(format!("Could not find corresponding column of {name}"))
        })?;
        headers.push(column);
    }

    let position = |column: BestlistColumn| {
        headers.iter().position(|c| *c == column).ok_or_else(|| {
            SyncError::ScrapeError(format!("Bestlist header lacks the {column} column"))
        })
    };
    let athlete_index = position(BestlistColumn::Athlete)?;
    let club_index = position(BestlistColumn::Club)?;
    let event_index = position(BestlistColumn::Event)?;

    let width = headers.len();
    headers.extend([
        BestlistColumn::AthleteCode,
        BestlistColumn::ClubCode,
        BestlistColumn::EventCode,
    ]);
    let mut bestlist = BestlistTable::new(headers);

    for row in rows {
        let cells: Vec<ElementRef> = row.select(&cell_selector).collect();
        if cells.len() != width {
            return Ok(None);
        }

        let mut values: Vec<String> = cells.iter().map(|cell| visible_text(*cell)).collect();
        values.push(extract_code(cells[athlete_index], ATHLETE_KEY)?);
        values.push(extract_code(cells[club_index], CLUB_KEY)?);
        values.push(extract_code(cells[event_index], EVENT_KEY)?);
        bestlist.push_row(values)?;
    }

    if bestlist.is_empty() {
        return Ok(None);
    }

    Ok(Some(bestlist))
}

/// Text of an element without the content of tooltips nested in it.
fn visible_text(element: ElementRef) -> String {
    let mut text = String::new();
    for node in element.descendants() {
        let Some(fragment) = node.value().as_text() else {
            continue;
        };
        let in_tooltip = node.ancestors().filter_map(ElementRef::wrap).any(|ancestor| {
            ancestor
                .value()
                .classes()
                .any(|class| class == TOOLTIP_CLASS)
        });
        if !in_tooltip {
            text.push_str(fragment);
        }
    }
    text.trim().to_string()
}

/// The `key` query parameter of the `openURLForBestlist('…')` link inside `cell`. Empty if the
/// cell carries no link.
fn extract_code(cell: ElementRef, key: &str) -> Result<String> {
    let clickable = selector("[onclick]")?;
    let onclick = cell
        .value()
        .attr("onclick")
        .or_else(|| {
            cell.select(&clickable)
                .next()
                .and_then(|element| element.value().attr("onclick"))
        })
        .unwrap_or_default();

    let Some(link) = CODE_LINK.captures(onclick).and_then(|caps| caps.get(1)) else {
        return Ok(String::new());
    };
    let query = link
        .as_str()
        .split_once('?')
        .map(|(_, query)| query)
        .unwrap_or_default();

    Ok(url::form_urlencoded::parse(query.as_bytes())
        .find(|(k, _)| k == key)
        .map(|(_, v)| v.into_owned())
        .unwrap_or_default())
}

/// Years listed in the year dropdown of the bestlist page, most recent first.
pub fn parse_available_years(page: &str) -> Result<Vec<i32>> {
    let document = Html::parse_document(page);
    let option_selector = selector(r#"[id="form_anonym:bestlistYear_input"] option"#)?;

    let mut years: Vec<i32> = document
        .select(&option_selector)
        .filter_map(|option| option.value().attr("value"))
        .filter_map(|value| value.trim().parse().ok())
        .collect();
    years.sort_unstable_by(|a, b| b.cmp(a));
    years.dedup();

    Ok(years)
}
