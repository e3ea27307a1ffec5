use std::sync::Arc;

use tracing::{debug, info};
use uuid::Uuid;

use crate::database::{InterviewStore, ProfileStore, ShadowingRequestStore};
use crate::dto::interview_dto::{CreateInterviewPayload, InterviewListQuery, UpdateInterviewPayload};
use crate::error::{Error, Result};
use crate::models::{
    interview::{Interview, InterviewStatus},
    profile::Profile,
    shadowing_request::ShadowingRequest,
};
use crate::services::calendar_service::{CalendarBridge, CalendarSync};

const DEFAULT_PER_PAGE: i64 = 20;
const MAX_PER_PAGE: i64 = 100;

#[derive(Clone)]
pub struct InterviewService {
    interviews: Arc<dyn InterviewStore>,
    profiles: Arc<dyn ProfileStore>,
    requests: Arc<dyn ShadowingRequestStore>,
    calendar: Arc<dyn CalendarBridge>,
}

#[derive(Debug, Clone)]
pub struct InterviewList {
    pub items: Vec<Interview>,
    pub total: i64,
    pub page: i64,
    pub per_page: i64,
    pub total_pages: i64,
}

#[derive(Debug, Clone)]
pub struct InterviewDetail {
    pub interview: Interview,
    pub shadowing_requests: Vec<ShadowingRequest>,
}

impl InterviewService {
    pub fn new(
        interviews: Arc<dyn InterviewStore>,
        profiles: Arc<dyn ProfileStore>,
        requests: Arc<dyn ShadowingRequestStore>,
        calendar: Arc<dyn CalendarBridge>,
    ) -> Self {
        Self {
            interviews,
            profiles,
            requests,
            calendar,
        }
    }

    /// Persists a SCHEDULED interview, then tries to attach a calendar
    /// event. The interview is returned without an event id if that fails.
    pub async fn create(&self, payload: CreateInterviewPayload) -> Result<Interview> {
        debug!(interviewer_id = %payload.interviewer_id, "creating interview");

        let interviewer = self
            .profiles
            .find_by_id(payload.interviewer_id)
            .await?
            .ok_or_else(|| {
                Error::NotFound(format!("Interviewer not found: {}", payload.interviewer_id))
            })?;

        let interview = Interview {
            id: Uuid::new_v4(),
            interviewer_id: interviewer.id,
            google_event_id: None,
            candidate_info: payload.candidate_info,
            tech_stack: payload.tech_stack,
            start_time: payload.start_time,
            end_time: payload.end_time,
            status: InterviewStatus::Scheduled,
        };
        let mut interview = self.interviews.save(&interview).await?;

        let sync: CalendarSync<String> = self
            .calendar
            .create_event(&interviewer, &interview)
            .await
            .into();
        if let Some(event_id) = sync.settle("create event", interview.id) {
            interview.google_event_id = Some(event_id);
            interview = self.interviews.save(&interview).await?;
        }

        info!(interview_id = %interview.id, "interview scheduled");
        Ok(interview)
    }

    pub async fn get(&self, id: Uuid) -> Result<Interview> {
        self.interviews
            .find_by_id(id)
            .await?
            .ok_or_else(|| Error::NotFound(format!("Interview not found: {}", id)))
    }

    pub async fn get_detail(&self, id: Uuid) -> Result<InterviewDetail> {
        let interview = self.get(id).await?;
        let shadowing_requests = self.requests.list_by_interview(id).await?;
        Ok(InterviewDetail {
            interview,
            shadowing_requests,
        })
    }

    pub async fn list(&self, query: InterviewListQuery) -> Result<InterviewList> {
        let page = query.page.unwrap_or(1).max(1);
        let per_page = query
            .per_page
            .unwrap_or(DEFAULT_PER_PAGE)
            .clamp(1, MAX_PER_PAGE);
        let offset = (page - 1).saturating_mul(per_page);

        let items = self.interviews.list(offset, per_page).await?;
        let total = self.interviews.count().await?;
        let total_pages = (total + per_page - 1) / per_page;

        Ok(InterviewList {
            items,
            total,
            page,
            per_page,
            total_pages,
        })
    }

    pub async fn update(&self, id: Uuid, payload: UpdateInterviewPayload) -> Result<Interview> {
        let mut interview = self.get(id).await?;

        interview.candidate_info = payload.candidate_info;
        interview.tech_stack = payload.tech_stack;
        interview.start_time = payload.start_time;
        interview.end_time = payload.end_time;
        interview.status = payload.status;

        let interview = self.interviews.save(&interview).await?;

        if interview.google_event_id.is_some() {
            let sync: CalendarSync<()> = match self.calendar_owner(&interview).await? {
                Some(interviewer) => self
                    .calendar
                    .update_event(&interviewer, &interview)
                    .await
                    .into(),
                None => CalendarSync::Skipped,
            };
            sync.settle("update event", interview.id);
        }

        Ok(interview)
    }

    /// Removes the calendar event first (best-effort), then the record.
    pub async fn delete(&self, id: Uuid) -> Result<()> {
        let interview = self.get(id).await?;

        if let Some(event_id) = interview.google_event_id.as_deref() {
            let sync: CalendarSync<()> = match self.calendar_owner(&interview).await? {
                Some(interviewer) => self.calendar.delete_event(&interviewer, event_id).await.into(),
                None => CalendarSync::Skipped,
            };
            sync.settle("delete event", interview.id);
        }

        self.interviews.delete(id).await?;
        info!(interview_id = %id, "interview deleted");
        Ok(())
    }

    async fn calendar_owner(&self, interview: &Interview) -> Result<Option<Profile>> {
        let owner = self.profiles.find_by_id(interview.interviewer_id).await?;
        if owner.is_none() {
            debug!(interview_id = %interview.id, "interviewer profile gone, skipping calendar");
        }
        Ok(owner)
    }
}
