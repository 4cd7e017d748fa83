//! Canned payloads served in mock mode.

use std::time::Duration;

use async_trait::async_trait;
use shared::{
    domain::{Mode, UniversityId},
    protocol::{
        BandoRequest, BandoResult, BandoSummary, Citation, CompatibleExam, Destination,
        ExamsReport, ExamsRequest, OfferedExam, Shortlist, ShortlistRequest,
    },
};
use tracing::debug;

use crate::{error::FetchError, study_plan::StudyPlanFile, DataSource};

const BANDO_DELAY: Duration = Duration::from_millis(350);
const SHORTLIST_DELAY: Duration = Duration::from_millis(450);
const EXAMS_DELAY: Duration = Duration::from_millis(450);

/// Offline data source returning fixed payloads after a short simulated
/// latency.
#[derive(Debug, Clone)]
pub struct MockDataSource {
    bando_delay: Duration,
    shortlist_delay: Duration,
    exams_delay: Duration,
}

impl Default for MockDataSource {
    fn default() -> Self {
        Self {
            bando_delay: BANDO_DELAY,
            shortlist_delay: SHORTLIST_DELAY,
            exams_delay: EXAMS_DELAY,
        }
    }
}

impl MockDataSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Same payloads with no simulated latency.
    pub fn instant() -> Self {
        Self {
            bando_delay: Duration::ZERO,
            shortlist_delay: Duration::ZERO,
            exams_delay: Duration::ZERO,
        }
    }
}

fn citation(doc_id: &str, page: u32) -> Citation {
    Citation {
        doc_id: doc_id.to_string(),
        page: Some(page),
        url: Some("#".to_string()),
    }
}

pub fn mock_bando() -> BandoResult {
    BandoResult::Found {
        summary: BandoSummary {
            eligibility:
                "Requisiti CFU min 24, lingua EN/IT B2, finestre di candidatura trimestrali."
                    .to_string(),
            departments: vec![
                "Informatica".to_string(),
                "AI & Data Eng.".to_string(),
                "Telecomunicazioni".to_string(),
            ],
            periods: vec!["Fall".to_string(), "Spring".to_string()],
            notes: "Equivalenza ECTS per esami a scelta e vincoli propedeuticità.".to_string(),
        },
        citations: vec![
            citation("pisa_bando_2025.pdf", 3),
            citation("pisa_bando_2025.pdf", 7),
        ],
    }
}

pub fn mock_shortlist() -> Shortlist {
    Shortlist {
        items: vec![
            Destination {
                id_university: UniversityId::new("UPC-EETAC"),
                id_city: "Barcelona".to_string(),
                description: "Rete solida di corsi ML/Networks, insegnamento EN, corsi Spring/Fall, requisiti lingua EN B2.".to_string(),
                citations: vec![citation("upc_eetac_guide_2025.pdf", 12)],
                site_url: Some("https://www.upc.edu/en/education/ects/erasmus".to_string()),
            },
            Destination {
                id_university: UniversityId::new("TUM"),
                id_city: "Munich".to_string(),
                description: "Offerta avanzata DL/CV, progetti industry, lingua EN B2.".to_string(),
                citations: vec![citation("tum_catalog_2025.pdf", 5)],
                site_url: Some("https://www.tum.de/en/studies/going-abroad/erasmus".to_string()),
            },
        ],
    }
}

pub fn mock_exams() -> ExamsReport {
    ExamsReport {
        download_pdf: "https://cdn.example.com/incoming/UPC-EETAC-exams-2025.pdf".to_string(),
        incoming_exams_full: vec![
            OfferedExam {
                name: "Wireless Communications".to_string(),
                ects: 6.0,
                semester: "Fall/Spring".to_string(),
                lang: "EN".to_string(),
            },
            OfferedExam {
                name: "Big Data and Data Mining".to_string(),
                ects: 6.0,
                semester: "Spring".to_string(),
                lang: "EN".to_string(),
            },
        ],
        compatible_exams: vec![CompatibleExam {
            name: "Big Data and Data Mining".to_string(),
            reason: "Allineato a Data Mining del piano; prerequisiti soddisfatti.".to_string(),
            citations: vec![citation("upc_eetac_catalog.pdf", 9)],
        }],
    }
}

#[async_trait]
impl DataSource for MockDataSource {
    fn mode(&self) -> Mode {
        Mode::Mock
    }

    async fn lookup_bando(&self, request: &BandoRequest) -> Result<BandoResult, FetchError> {
        debug!(university = %request.university_from, "serving mock bando");
        tokio::time::sleep(self.bando_delay).await;
        Ok(mock_bando())
    }

    async fn generate_shortlist(
        &self,
        request: &ShortlistRequest,
        _study_plan: Option<&StudyPlanFile>,
    ) -> Result<Shortlist, FetchError> {
        debug!(department = %request.department, "serving mock shortlist");
        tokio::time::sleep(self.shortlist_delay).await;
        Ok(mock_shortlist())
    }

    async fn lookup_exams(
        &self,
        destination: &UniversityId,
        _request: &ExamsRequest,
    ) -> Result<ExamsReport, FetchError> {
        debug!(%destination, "serving mock exams");
        tokio::time::sleep(self.exams_delay).await;
        Ok(mock_exams())
    }
}
