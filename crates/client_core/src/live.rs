//! HTTP data source talking to the collaborator service.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{
    multipart::{Form, Part},
    Client, RequestBuilder,
};
use serde::de::DeserializeOwned;
use shared::{
    domain::{Mode, UniversityId},
    error::ApiError,
    protocol::{
        BandoRequest, BandoResult, ExamsReport, ExamsRequest, Shortlist, ShortlistRequest,
    },
};
use tracing::{debug, warn};
use url::Url;

use crate::{error::FetchError, study_plan::StudyPlanFile, DataSource};

const STUDY_PLAN_FIELD: &str = "study_plan_pdf";

pub struct LiveDataSource {
    http: Client,
    api_base: Url,
}

impl LiveDataSource {
    pub fn new(api_base: &str, timeout: Option<Duration>) -> Result<Self, FetchError> {
        let api_base = Url::parse(api_base.trim())
            .map_err(|_| FetchError::InvalidApiBase(api_base.to_string()))?;
        if api_base.cannot_be_a_base() {
            return Err(FetchError::InvalidApiBase(api_base.to_string()));
        }
        let mut builder = Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let http = builder.build().map_err(FetchError::transport)?;
        Ok(Self { http, api_base })
    }

    pub fn api_base(&self) -> &str {
        self.api_base.as_str()
    }

    pub(crate) fn endpoint(&self, segments: &[&str]) -> Result<Url, FetchError> {
        let mut url = self.api_base.clone();
        url.path_segments_mut()
            .map_err(|_| FetchError::InvalidApiBase(self.api_base.to_string()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    async fn send<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T, FetchError> {
        let response = request.send().await.map_err(FetchError::transport)?;
        let status = response.status();
        let body = response.bytes().await.map_err(FetchError::transport)?;
        if !status.is_success() {
            let detail = ApiError::from_response(status.as_u16(), &body);
            warn!(status = status.as_u16(), ?detail, "collaborator returned an error");
            return Err(FetchError::Status {
                status: status.as_u16(),
                detail,
            });
        }
        serde_json::from_slice(&body).map_err(|err| FetchError::Malformed(err.to_string()))
    }
}

fn shortlist_form(
    request: &ShortlistRequest,
    study_plan: &StudyPlanFile,
) -> Result<Form, FetchError> {
    let mut form = Form::new()
        .text("university_from", request.university_from.clone())
        .text("department", request.department.clone())
        .text("period", request.period.as_str());
    if let Some(text) = &request.study_plan_text {
        form = form.text("study_plan_text", text.clone());
    }
    let part = Part::stream_with_length(study_plan.shared_bytes(), study_plan.size_bytes())
        .file_name(study_plan.filename().to_string())
        .mime_str(study_plan.mime_type())
        .map_err(FetchError::transport)?;
    Ok(form.part(STUDY_PLAN_FIELD, part))
}

/// Live source standing in for an API base that could not be parsed. Every
/// request fails without touching the network.
pub struct UnavailableLiveSource {
    api_base: String,
}

impl UnavailableLiveSource {
    pub fn new(api_base: &str) -> Self {
        Self {
            api_base: api_base.to_string(),
        }
    }

    fn refuse<T>(&self) -> Result<T, FetchError> {
        Err(FetchError::InvalidApiBase(self.api_base.clone()))
    }
}

#[async_trait]
impl DataSource for UnavailableLiveSource {
    fn mode(&self) -> Mode {
        Mode::Live
    }

    async fn lookup_bando(&self, _request: &BandoRequest) -> Result<BandoResult, FetchError> {
        self.refuse()
    }

    async fn generate_shortlist(
        &self,
        _request: &ShortlistRequest,
        _study_plan: Option<&StudyPlanFile>,
    ) -> Result<Shortlist, FetchError> {
        self.refuse()
    }

    async fn lookup_exams(
        &self,
        _destination: &UniversityId,
        _request: &ExamsRequest,
    ) -> Result<ExamsReport, FetchError> {
        self.refuse()
    }
}

#[async_trait]
impl DataSource for LiveDataSource {
    fn mode(&self) -> Mode {
        Mode::Live
    }

    async fn lookup_bando(&self, request: &BandoRequest) -> Result<BandoResult, FetchError> {
        let url = self.endpoint(&["bandi", "summary"])?;
        debug!(%url, "requesting bando summary");
        self.send(self.http.post(url).json(request)).await
    }

    async fn generate_shortlist(
        &self,
        request: &ShortlistRequest,
        study_plan: Option<&StudyPlanFile>,
    ) -> Result<Shortlist, FetchError> {
        let url = self.endpoint(&["mete", "shortlist"])?;
        let builder = match study_plan {
            Some(study_plan) => {
                debug!(%url, filename = study_plan.filename(), "requesting shortlist (multipart)");
                self.http
                    .post(url)
                    .multipart(shortlist_form(request, study_plan)?)
            }
            None => {
                debug!(%url, "requesting shortlist (json)");
                self.http.post(url).json(request)
            }
        };
        self.send(builder).await
    }

    async fn lookup_exams(
        &self,
        destination: &UniversityId,
        request: &ExamsRequest,
    ) -> Result<ExamsReport, FetchError> {
        let url = self.endpoint(&["mete", destination.as_str(), "exams"])?;
        debug!(%url, "requesting exams");
        self.send(self.http.post(url).json(request)).await
    }
}
