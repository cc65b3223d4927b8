use scraper::Html;
use tiny_bail::prelude::*;
use url::Url;

use crate::{
    document::{extract_field, marked, Locator, Node},
    error::{Error, Result},
    offer::{Offer, Salaries, SalaryBand, TechStack},
};

const TITLE: Locator = Locator::Css("h1");
const CATEGORY: Locator = Locator::AfterMarked {
    container: "svg",
    marker: "path[fill*='AboutIcon']",
    next: "div",
};
const COMPANY: Locator = Locator::InsideMarked {
    container: "div",
    marker: "svg[data-testid='ApartmentRoundedIcon']",
    target: "h2",
};
const LOCATION: Locator = Locator::Css("svg[data-testid='PlaceOutlinedIcon'] ~ div span");
const WORK_TYPE: Locator = detail("Type of work");
const EXPERIENCE: Locator = detail("Experience");
const EMPLOYMENT_TYPE: Locator = detail("Employment Type");
const OPERATING_MODE: Locator = detail("Operating mode");

const SALARY_LABEL: &str = "span.css-1waow8k";
const SALARY_AMOUNT: &str = "span.css-mrzdjb";

const TECH_STACK_HEADING: &str = "Tech stack";
const SKILL_BLOCK: &str = "div.css-jfr3nf";
const SKILL_LEVEL: Locator = Locator::Css("ul + span");

/// A value in the offer's detail grid, shown right after its label.
const fn detail(label: &'static str) -> Locator {
    Locator::AfterLabel {
        tag: "div",
        label,
        next: "div",
    }
}

/// Parses a detail page's HTML into an offer.
pub fn parse_offer(page_html: &str, id: u32, url: Url) -> Result<Offer> {
    let doc = Html::parse_document(page_html);
    extract_offer(&doc.root_element(), id, url)
}

/// Extracts an offer from a detail page.
///
/// Only the title is required; every other field is left empty when the page
/// lacks it.
pub fn extract_offer<N: Node>(root: &N, id: u32, url: Url) -> Result<Offer> {
    let title = extract_field(root, &TITLE).ok_or(Error::MissingField("job title"))?;

    Ok(Offer {
        id,
        url,
        title,
        category: extract_field(root, &CATEGORY),
        company: extract_field(root, &COMPANY),
        location: extract_field(root, &LOCATION),
        salary: extract_salaries(root),
        work_type: extract_field(root, &WORK_TYPE),
        experience: extract_field(root, &EXPERIENCE),
        employment_type: extract_field(root, &EMPLOYMENT_TYPE),
        operating_mode: extract_field(root, &OPERATING_MODE),
        tech_stack: extract_tech_stack(root),
    })
}

/// Collects label/amount pairs from every block next to an icon.
///
/// Nested layouts yield the same pair more than once; later pairs overwrite
/// earlier ones for the same band.
fn extract_salaries<N: Node>(root: &N) -> Salaries {
    let mut salaries = Salaries::default();
    for container in marked(root, "div", "svg") {
        for block in container.element_children() {
            cq!(block.is("div"));
            let label = cq!(block.first(SALARY_LABEL)).text_content();
            let amount = cq!(block.first(SALARY_AMOUNT)).text_content();
            let band = cq!(SalaryBand::classify(&label));
            salaries.set(band, amount);
        }
    }
    salaries
}

fn extract_tech_stack<N: Node>(root: &N) -> TechStack {
    let mut tech_stack = TechStack::default();
    let Some(section) = root
        .select_all("h3")
        .into_iter()
        .find(|heading| heading.text_content() == TECH_STACK_HEADING)
        .and_then(|heading| heading.parent_element())
    else {
        return tech_stack;
    };

    for block in section.select_all(SKILL_BLOCK) {
        let name = cq!(block.first("h4")).text_content();
        cq!(!name.is_empty());
        tech_stack.insert(name, extract_field(&block, &SKILL_LEVEL));
    }
    tech_stack
}

#[cfg(test)]
mod tests {
    use super::*;

    const OFFER_PAGE: &str = r#"
        <html><body><main>
          <h1>Junior Data Engineer</h1>
          <div class="header">
            <div class="category">
              <svg><path fill="url(#AboutIcon)"></path></svg>
              <div>Data</div>
            </div>
            <div class="company">
              <svg data-testid="ApartmentRoundedIcon"></svg>
              <h2>Acme Analytics</h2>
            </div>
            <div class="place">
              <svg data-testid="PlaceOutlinedIcon"></svg>
              <div><span>Warszawa</span></div>
            </div>
          </div>
          <div class="salaries">
            <svg></svg>
            <div>
              <span class="css-mrzdjb">12 000 - 16 000 PLN</span>
              <span class="css-1waow8k">B2B (net per month)</span>
            </div>
            <div>
              <span class="css-mrzdjb">10 000 - 13 000 PLN</span>
              <span class="css-1waow8k">Permanent (gross)</span>
            </div>
            <div>
              <span class="css-mrzdjb">???</span>
              <span class="css-1waow8k">Specific-task contract</span>
            </div>
            <div><span class="css-1waow8k">Mandate</span></div>
          </div>
          <div class="details">
            <div>Type of work</div><div>Full-time</div>
            <div>Experience</div><div>Junior</div>
            <div>Employment Type</div><div>B2B, Permanent</div>
            <div>Operating mode</div><div>Hybrid</div>
          </div>
          <div class="tech">
            <h3>Tech stack</h3>
            <div class="css-jfr3nf"><h4>Python</h4><ul><li></li></ul><span>Regular</span></div>
            <div class="css-jfr3nf"><h4>SQL</h4><ul><li></li></ul><span>Junior</span></div>
            <div class="css-jfr3nf"><h4>Airflow</h4><ul><li></li></ul></div>
            <div class="css-jfr3nf"><ul><li></li></ul><span>Nice to have</span></div>
            <div class="css-jfr3nf"><h4>Python</h4><ul><li></li></ul><span>Advanced</span></div>
          </div>
        </main></body></html>
    "#;

    fn url() -> Url {
        Url::parse("https://justjoin.it/job-offer/acme-junior-data-engineer").unwrap()
    }

    #[test]
    fn full_page() {
        let offer = parse_offer(OFFER_PAGE, 3, url()).unwrap();

        assert_eq!(offer.id, 3);
        assert_eq!(offer.title, "Junior Data Engineer");
        assert_eq!(offer.category.as_deref(), Some("Data"));
        assert_eq!(offer.company.as_deref(), Some("Acme Analytics"));
        assert_eq!(offer.location.as_deref(), Some("Warszawa"));
        assert_eq!(offer.work_type.as_deref(), Some("Full-time"));
        assert_eq!(offer.experience.as_deref(), Some("Junior"));
        assert_eq!(offer.employment_type.as_deref(), Some("B2B, Permanent"));
        assert_eq!(offer.operating_mode.as_deref(), Some("Hybrid"));
    }

    #[test]
    fn salaries_by_label() {
        let offer = parse_offer(OFFER_PAGE, 3, url()).unwrap();

        assert_eq!(
            offer.salary.get(SalaryBand::B2b),
            Some("12 000 - 16 000 PLN")
        );
        assert_eq!(
            offer.salary.get(SalaryBand::Permanent),
            Some("10 000 - 13 000 PLN"),
        );
        // No amount next to the label.
        assert_eq!(offer.salary.get(SalaryBand::Mandate), None);
        assert_eq!(offer.salary.get(SalaryBand::Any), None);
        assert_eq!(offer.salary.get(SalaryBand::Internship), None);
    }

    #[test]
    fn tech_stack_blocks() {
        let offer = parse_offer(OFFER_PAGE, 3, url()).unwrap();

        assert_eq!(
            offer.tech_stack.to_string(),
            "Python: Advanced; SQL: Junior; Airflow: N/A",
        );
    }

    #[test]
    fn missing_fields_are_empty() {
        let page = "<html><body><h1>Backend Developer</h1></body></html>";
        let offer = parse_offer(page, 1, url()).unwrap();

        assert_eq!(offer.title, "Backend Developer");
        assert_eq!(offer.category, None);
        assert_eq!(offer.company, None);
        assert_eq!(offer.location, None);
        assert_eq!(offer.salary, Salaries::default());
        assert_eq!(offer.operating_mode, None);
        assert!(offer.tech_stack.is_empty());
    }

    #[test]
    fn missing_title_fails() {
        let page = "<html><body><h2>Acme</h2></body></html>";
        assert!(matches!(
            parse_offer(page, 1, url()),
            Err(Error::MissingField(_)),
        ));
    }
}
