use serde::{Deserialize, Serialize};
use url::Url;

use crate::domain::{Period, UniversityId};

const ERASMUS_SEARCH_URL: &str = "https://www.google.com/search";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BandoRequest {
    pub university_from: String,
}

/// A pointer into one of the indexed source documents.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Citation {
    #[serde(default)]
    pub doc_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub page: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

impl Citation {
    pub fn label(&self) -> String {
        let doc = if self.doc_id.is_empty() {
            "doc"
        } else {
            self.doc_id.as_str()
        };
        match self.page {
            Some(page) => format!("{doc} p.{page}"),
            None => doc.to_string(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BandoSummary {
    #[serde(default)]
    pub eligibility: String,
    #[serde(default)]
    pub departments: Vec<String>,
    #[serde(default)]
    pub periods: Vec<String>,
    #[serde(default)]
    pub notes: String,
}

/// Outcome of a bando lookup. `NotFound` is a successful response, not an
/// error: the collaborator simply has no call indexed for that institution.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum BandoResult {
    Found {
        #[serde(default)]
        summary: BandoSummary,
        #[serde(default)]
        citations: Vec<Citation>,
    },
    NotFound {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        message: Option<String>,
    },
}

impl BandoResult {
    pub fn is_found(&self) -> bool {
        matches!(self, Self::Found { .. })
    }
}

/// Text fields of a shortlist request. In the PDF profile the same fields are
/// sent as multipart parts next to the document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShortlistRequest {
    pub university_from: String,
    pub department: String,
    pub period: Period,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub study_plan_text: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Destination {
    pub id_university: UniversityId,
    pub id_city: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub citations: Vec<Citation>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub site_url: Option<String>,
}

impl Destination {
    /// Link to the destination's exchange page, or a web search for it when
    /// the collaborator did not provide one.
    pub fn erasmus_link(&self) -> Option<String> {
        if let Some(site_url) = self.site_url.as_deref().filter(|url| !url.trim().is_empty()) {
            return Some(site_url.to_string());
        }
        let query = format!("Erasmus {} {}", self.id_university, self.id_city);
        let query = query.trim();
        if query == "Erasmus" {
            return None;
        }
        Url::parse_with_params(ERASMUS_SEARCH_URL, &[("q", query)])
            .ok()
            .map(String::from)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Shortlist {
    #[serde(default)]
    pub items: Vec<Destination>,
}

impl Shortlist {
    pub fn position(&self, id: &UniversityId) -> Option<usize> {
        self.items.iter().position(|item| &item.id_university == id)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExamsRequest {
    pub study_plan_text: String,
    pub period: Period,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OfferedExam {
    pub name: String,
    pub ects: f64,
    #[serde(default)]
    pub semester: String,
    #[serde(default)]
    pub lang: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompatibleExam {
    pub name: String,
    #[serde(default)]
    pub reason: String,
    #[serde(default)]
    pub citations: Vec<Citation>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExamsReport {
    pub download_pdf: String,
    pub incoming_exams_full: Vec<OfferedExam>,
    #[serde(default)]
    pub compatible_exams: Vec<CompatibleExam>,
}

#[cfg(test)]
#[path = "tests/protocol_tests.rs"]
mod tests;
