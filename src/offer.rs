use std::{convert::Infallible, fmt::Display, fs::File, io, path::Path, str::FromStr};

use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::{Error, Result};

/// Written in place of an absent value in the CSV export.
pub const NOT_AVAILABLE: &str = "N/A";

/// A scraped job offer.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct Offer {
    /// Position of the offer in discovery order, starting at 1.
    pub id: u32,
    /// The URL to the offer's detail page.
    pub url: Url,
    pub title: String,
    pub category: Option<String>,
    pub company: Option<String>,
    pub location: Option<String>,
    pub salary: Salaries,
    pub work_type: Option<String>,
    pub experience: Option<String>,
    pub employment_type: Option<String>,
    pub operating_mode: Option<String>,
    /// Required skills and the proficiency the offer asks for.
    pub tech_stack: TechStack,
}

impl Display for Offer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", &self.title)
    }
}

impl Offer {
    pub fn new(id: u32, url: Url, title: impl Into<String>) -> Self {
        Self {
            id,
            url,
            title: title.into(),
            category: None,
            company: None,
            location: None,
            salary: Salaries::default(),
            work_type: None,
            experience: None,
            employment_type: None,
            operating_mode: None,
            tech_stack: TechStack::default(),
        }
    }

    pub fn with_company(mut self, company: impl Into<String>) -> Self {
        self.company = Some(company.into());
        self
    }

    pub fn with_location(mut self, location: impl Into<String>) -> Self {
        self.location = Some(location.into());
        self
    }

    pub fn with_tech_stack(mut self, tech_stack: TechStack) -> Self {
        self.tech_stack = tech_stack;
        self
    }
}

/// The contract types a salary can be quoted for.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum SalaryBand {
    Any,
    B2b,
    Internship,
    Mandate,
    Permanent,
}

impl SalaryBand {
    pub const ALL: [SalaryBand; 5] = [
        SalaryBand::Any,
        SalaryBand::B2b,
        SalaryBand::Internship,
        SalaryBand::Mandate,
        SalaryBand::Permanent,
    ];

    /// Classifies a salary label such as "B2B (net per month)".
    pub fn classify(label: &str) -> Option<Self> {
        let label = label.to_lowercase();
        if label.contains("any") {
            Some(SalaryBand::Any)
        } else if label.contains("b2b") {
            Some(SalaryBand::B2b)
        } else if label.contains("internship") {
            Some(SalaryBand::Internship)
        } else if label.contains("mandate") {
            Some(SalaryBand::Mandate)
        } else if label.contains("perm") {
            Some(SalaryBand::Permanent)
        } else {
            None
        }
    }
}

#[derive(Clone, Default, PartialEq, Eq, Debug)]
pub struct Salaries {
    pub any: Option<String>,
    pub b2b: Option<String>,
    pub internship: Option<String>,
    pub mandate: Option<String>,
    pub permanent: Option<String>,
}

impl Salaries {
    pub fn get(&self, band: SalaryBand) -> Option<&str> {
        self.slot(band).as_deref()
    }

    pub fn set(&mut self, band: SalaryBand, amount: impl Into<String>) {
        *self.slot_mut(band) = Some(amount.into());
    }

    fn slot(&self, band: SalaryBand) -> &Option<String> {
        match band {
            SalaryBand::Any => &self.any,
            SalaryBand::B2b => &self.b2b,
            SalaryBand::Internship => &self.internship,
            SalaryBand::Mandate => &self.mandate,
            SalaryBand::Permanent => &self.permanent,
        }
    }

    fn slot_mut(&mut self, band: SalaryBand) -> &mut Option<String> {
        match band {
            SalaryBand::Any => &mut self.any,
            SalaryBand::B2b => &mut self.b2b,
            SalaryBand::Internship => &mut self.internship,
            SalaryBand::Mandate => &mut self.mandate,
            SalaryBand::Permanent => &mut self.permanent,
        }
    }
}

/// Skill names with their requested levels, in page order.
///
/// Stored in the CSV as `"name1: level1; name2: level2"`. Neither separator
/// is escaped, so a name or level containing `;` or `:` does not survive a
/// round trip. [`insert`](Self::insert) keeps one entry per name, but a
/// parsed cell keeps every entry as written, repeats included.
#[derive(Clone, Default, PartialEq, Eq, Debug)]
pub struct TechStack(Vec<(String, Option<String>)>);

impl TechStack {
    /// Adds a skill. A repeated name keeps its position and takes the new level.
    pub fn insert(&mut self, name: impl Into<String>, level: Option<String>) {
        let name = name.into();
        match self.0.iter_mut().find(|(n, _)| *n == name) {
            Some(entry) => entry.1 = level,
            None => self.0.push((name, level)),
        }
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, Option<&str>)> {
        self.0
            .iter()
            .map(|(name, level)| (name.as_str(), level.as_deref()))
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(|(name, _)| name.as_str())
    }
}

impl Display for TechStack {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for (i, (name, level)) in self.iter().enumerate() {
            if i > 0 {
                f.write_str("; ")?;
            }
            write!(f, "{}: {}", name, level.unwrap_or(NOT_AVAILABLE))?;
        }
        Ok(())
    }
}

impl FromStr for TechStack {
    type Err = Infallible;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let mut tech_stack = TechStack::default();
        for segment in s.split(';') {
            let Some((name, level)) = segment.split_once(':') else {
                continue;
            };
            tech_stack
                .0
                .push((name.trim().to_string(), from_cell(level.trim())));
        }
        Ok(tech_stack)
    }
}

impl<S: Into<String>> FromIterator<(S, Option<String>)> for TechStack {
    fn from_iter<T: IntoIterator<Item = (S, Option<String>)>>(iter: T) -> Self {
        let mut tech_stack = TechStack::default();
        for (name, level) in iter {
            tech_stack.insert(name, level);
        }
        tech_stack
    }
}

/// One CSV row. Column names and order are the export format.
#[derive(Serialize, Deserialize, Debug)]
struct Record {
    #[serde(rename = "ID")]
    id: u32,
    #[serde(rename = "Job URL")]
    url: String,
    #[serde(rename = "Job Title")]
    title: String,
    #[serde(rename = "Category")]
    category: String,
    #[serde(rename = "Company")]
    company: String,
    #[serde(rename = "Location")]
    location: String,
    #[serde(rename = "Salary Any")]
    salary_any: String,
    #[serde(rename = "Salary B2B")]
    salary_b2b: String,
    #[serde(rename = "Salary Internship")]
    salary_internship: String,
    #[serde(rename = "Salary Mandate")]
    salary_mandate: String,
    #[serde(rename = "Salary Permanent")]
    salary_permanent: String,
    #[serde(rename = "Work Type")]
    work_type: String,
    #[serde(rename = "Experience")]
    experience: String,
    #[serde(rename = "Employment Type")]
    employment_type: String,
    #[serde(rename = "Operating Mode")]
    operating_mode: String,
    #[serde(rename = "Tech Stack")]
    tech_stack: String,
}

impl Record {
    const HEADERS: [&'static str; 16] = [
        "ID",
        "Job URL",
        "Job Title",
        "Category",
        "Company",
        "Location",
        "Salary Any",
        "Salary B2B",
        "Salary Internship",
        "Salary Mandate",
        "Salary Permanent",
        "Work Type",
        "Experience",
        "Employment Type",
        "Operating Mode",
        "Tech Stack",
    ];
}

impl From<&Offer> for Record {
    fn from(offer: &Offer) -> Self {
        Self {
            id: offer.id,
            url: offer.url.to_string(),
            title: offer.title.clone(),
            category: to_cell(&offer.category),
            company: to_cell(&offer.company),
            location: to_cell(&offer.location),
            salary_any: to_cell(&offer.salary.any),
            salary_b2b: to_cell(&offer.salary.b2b),
            salary_internship: to_cell(&offer.salary.internship),
            salary_mandate: to_cell(&offer.salary.mandate),
            salary_permanent: to_cell(&offer.salary.permanent),
            work_type: to_cell(&offer.work_type),
            experience: to_cell(&offer.experience),
            employment_type: to_cell(&offer.employment_type),
            operating_mode: to_cell(&offer.operating_mode),
            tech_stack: offer.tech_stack.to_string(),
        }
    }
}

impl TryFrom<Record> for Offer {
    type Error = Error;

    fn try_from(record: Record) -> Result<Self> {
        Ok(Self {
            id: record.id,
            url: Url::parse(&record.url)?,
            title: record.title,
            category: from_cell(record.category),
            company: from_cell(record.company),
            location: from_cell(record.location),
            salary: Salaries {
                any: from_cell(record.salary_any),
                b2b: from_cell(record.salary_b2b),
                internship: from_cell(record.salary_internship),
                mandate: from_cell(record.salary_mandate),
                permanent: from_cell(record.salary_permanent),
            },
            work_type: from_cell(record.work_type),
            experience: from_cell(record.experience),
            employment_type: from_cell(record.employment_type),
            operating_mode: from_cell(record.operating_mode),
            tech_stack: record.tech_stack.parse().unwrap_or_default(),
        })
    }
}

fn to_cell(value: &Option<String>) -> String {
    value.as_deref().unwrap_or(NOT_AVAILABLE).to_string()
}

fn from_cell(cell: impl AsRef<str> + Into<String>) -> Option<String> {
    let text = cell.as_ref();
    if text.is_empty() || text == NOT_AVAILABLE {
        None
    } else {
        Some(cell.into())
    }
}

/// Writes offers as CSV, header first even when there are no offers.
pub fn write_offers(writer: impl io::Write, offers: &[Offer]) -> Result<()> {
    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(writer);
    writer.write_record(Record::HEADERS)?;
    for offer in offers {
        writer.serialize(Record::from(offer))?;
    }
    writer.flush()?;
    Ok(())
}

pub fn read_offers(reader: impl io::Read) -> Result<Vec<Offer>> {
    let mut reader = csv::Reader::from_reader(reader);
    let mut offers = Vec::new();
    for record in reader.deserialize::<Record>() {
        offers.push(Offer::try_from(record?)?);
    }
    Ok(offers)
}

pub fn save_offers(path: impl AsRef<Path>, offers: &[Offer]) -> Result<()> {
    write_offers(File::create(path)?, offers)
}

pub fn load_offers(path: impl AsRef<Path>) -> Result<Vec<Offer>> {
    read_offers(File::open(path)?)
}
