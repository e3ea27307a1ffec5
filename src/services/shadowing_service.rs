use std::sync::Arc;

use tracing::{debug, info};
use uuid::Uuid;

use crate::database::{InterviewStore, ProfileStore, ShadowingRequestStore};
use crate::error::{Error, Result};
use crate::models::{profile::Profile, shadowing_request::ShadowingRequest};
use crate::services::calendar_service::{CalendarBridge, CalendarSync};

#[derive(Clone)]
pub struct ShadowingService {
    requests: Arc<dyn ShadowingRequestStore>,
    interviews: Arc<dyn InterviewStore>,
    profiles: Arc<dyn ProfileStore>,
    calendar: Arc<dyn CalendarBridge>,
}

impl ShadowingService {
    pub fn new(
        requests: Arc<dyn ShadowingRequestStore>,
        interviews: Arc<dyn InterviewStore>,
        profiles: Arc<dyn ProfileStore>,
        calendar: Arc<dyn CalendarBridge>,
    ) -> Self {
        Self {
            requests,
            interviews,
            profiles,
            calendar,
        }
    }

    pub async fn request(&self, interview_id: Uuid, shadower_id: Uuid) -> Result<ShadowingRequest> {
        debug!(%interview_id, %shadower_id, "creating shadowing request");

        if self.interviews.find_by_id(interview_id).await?.is_none() {
            return Err(Error::NotFound(format!("Interview not found: {}", interview_id)));
        }
        if self.profiles.find_by_id(shadower_id).await?.is_none() {
            return Err(Error::NotFound(format!("Shadower not found: {}", shadower_id)));
        }

        self.requests
            .save(&ShadowingRequest::pending(interview_id, shadower_id))
            .await
    }

    pub async fn cancel(&self, id: Uuid) -> Result<ShadowingRequest> {
        let mut request = self.find(id).await?;
        request.cancel()?;
        self.requests.save(&request).await
    }

    /// Records the approval, then invites the shadower to the interview's
    /// calendar event. The invite never undoes a recorded approval.
    pub async fn approve(&self, id: Uuid) -> Result<ShadowingRequest> {
        let mut request = self.find(id).await?;
        request.approve()?;
        let request = self.requests.save(&request).await?;
        info!(request_id = %request.id, "shadowing request approved");

        self.invite_shadower(&request)
            .await
            .settle("add attendee", request.interview_id);
        Ok(request)
    }

    pub async fn reject(&self, id: Uuid, reason: Option<String>) -> Result<ShadowingRequest> {
        let mut request = self.find(id).await?;
        request.reject(reason)?;
        self.requests.save(&request).await
    }

    pub async fn list_for_interview(&self, interview_id: Uuid) -> Result<Vec<ShadowingRequest>> {
        if self.interviews.find_by_id(interview_id).await?.is_none() {
            return Err(Error::NotFound(format!("Interview not found: {}", interview_id)));
        }
        self.requests.list_by_interview(interview_id).await
    }

    pub async fn list_for_shadower(&self, shadower_id: Uuid) -> Result<Vec<ShadowingRequest>> {
        self.requests.list_by_shadower(shadower_id).await
    }

    async fn find(&self, id: Uuid) -> Result<ShadowingRequest> {
        self.requests
            .find_by_id(id)
            .await?
            .ok_or_else(|| Error::NotFound(format!("Shadowing request not found: {}", id)))
    }

    async fn invite_shadower(&self, request: &ShadowingRequest) -> CalendarSync<()> {
        match self.attendee_target(request).await {
            Ok(Some((interviewer, event_id, email))) => self
                .calendar
                .add_attendee(&interviewer, &event_id, &email)
                .await
                .into(),
            Ok(None) => CalendarSync::Skipped,
            Err(err) => CalendarSync::Failed(err),
        }
    }

    /// Interviewer credentials, event id and shadower address, if the
    /// interview has an event to invite into.
    async fn attendee_target(
        &self,
        request: &ShadowingRequest,
    ) -> Result<Option<(Profile, String, String)>> {
        let Some(interview) = self.interviews.find_by_id(request.interview_id).await? else {
            return Ok(None);
        };
        let Some(event_id) = interview.google_event_id else {
            debug!(interview_id = %interview.id, "no calendar event to invite into");
            return Ok(None);
        };
        let Some(interviewer) = self.profiles.find_by_id(interview.interviewer_id).await? else {
            return Ok(None);
        };
        let Some(shadower) = self.profiles.find_by_id(request.shadower_id).await? else {
            return Ok(None);
        };
        Ok(Some((interviewer, event_id, shadower.email)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::interview_store::MockInterviewStore;
    use crate::database::profile_store::MockProfileStore;
    use crate::database::shadowing_store::MockShadowingRequestStore;
    use crate::models::interview::{Interview, InterviewStatus};
    use crate::models::shadowing_request::ShadowingStatus;
    use crate::services::calendar_service::MockCalendarBridge;
    use chrono::{Duration, Utc};

    struct Fixture {
        interviewer: Profile,
        shadower: Profile,
        interview: Interview,
        request: ShadowingRequest,
    }

    fn fixture(event_id: Option<&str>) -> Fixture {
        let interviewer = Profile::first_login("sub-1", "interviewer@gm2dev.com");
        let shadower = Profile::first_login("sub-2", "shadow@gm2dev.com");
        let start = Utc::now() + Duration::days(1);
        let interview = Interview {
            id: Uuid::new_v4(),
            interviewer_id: interviewer.id,
            google_event_id: event_id.map(str::to_string),
            candidate_info: None,
            tech_stack: "Java".into(),
            start_time: start,
            end_time: start + Duration::hours(1),
            status: InterviewStatus::Scheduled,
        };
        let request = ShadowingRequest::pending(interview.id, shadower.id);
        Fixture {
            interviewer,
            shadower,
            interview,
            request,
        }
    }

    fn stores(f: &Fixture) -> (MockShadowingRequestStore, MockInterviewStore, MockProfileStore) {
        let mut requests = MockShadowingRequestStore::new();
        let request = f.request.clone();
        requests
            .expect_find_by_id()
            .returning(move |_| Ok(Some(request.clone())));

        let mut interviews = MockInterviewStore::new();
        let interview = f.interview.clone();
        interviews
            .expect_find_by_id()
            .returning(move |_| Ok(Some(interview.clone())));

        let mut profiles = MockProfileStore::new();
        let known = vec![f.interviewer.clone(), f.shadower.clone()];
        profiles
            .expect_find_by_id()
            .returning(move |id| Ok(known.iter().find(|p| p.id == id).cloned()));

        (requests, interviews, profiles)
    }

    fn service(
        requests: MockShadowingRequestStore,
        interviews: MockInterviewStore,
        profiles: MockProfileStore,
        calendar: MockCalendarBridge,
    ) -> ShadowingService {
        ShadowingService::new(
            Arc::new(requests),
            Arc::new(interviews),
            Arc::new(profiles),
            Arc::new(calendar),
        )
    }

    #[tokio::test]
    async fn request_starts_pending() {
        let f = fixture(None);
        let (mut requests, interviews, profiles) = stores(&f);
        requests
            .expect_save()
            .withf(|r| r.status == ShadowingStatus::Pending && r.reason.is_none())
            .returning(|r| Ok(r.clone()));

        let svc = service(requests, interviews, profiles, MockCalendarBridge::new());
        let created = svc.request(f.interview.id, f.shadower.id).await.unwrap();

        assert_eq!(created.interview_id, f.interview.id);
        assert_eq!(created.shadower_id, f.shadower.id);
        assert_eq!(created.status, ShadowingStatus::Pending);
    }

    #[tokio::test]
    async fn request_for_unknown_shadower_is_not_found() {
        let f = fixture(None);
        let (mut requests, interviews, profiles) = stores(&f);
        requests.expect_save().never();

        let svc = service(requests, interviews, profiles, MockCalendarBridge::new());
        let err = svc.request(f.interview.id, Uuid::new_v4()).await.unwrap_err();
        assert!(matches!(err, Error::NotFound(_)));
    }

    #[tokio::test]
    async fn approve_invites_shadower_to_event() {
        let f = fixture(Some("gcal-1"));
        let (mut requests, interviews, profiles) = stores(&f);
        requests.expect_save().returning(|r| Ok(r.clone()));

        let interviewer_id = f.interviewer.id;
        let mut calendar = MockCalendarBridge::new();
        calendar
            .expect_add_attendee()
            .withf(move |owner, event_id, email| {
                owner.id == interviewer_id && event_id == "gcal-1" && email == "shadow@gm2dev.com"
            })
            .times(1)
            .returning(|_, _, _| Ok(()));

        let svc = service(requests, interviews, profiles, calendar);
        let approved = svc.approve(f.request.id).await.unwrap();
        assert_eq!(approved.status, ShadowingStatus::Approved);
    }

    #[tokio::test]
    async fn approve_is_recorded_when_calendar_fails() {
        let f = fixture(Some("gcal-1"));
        let (mut requests, interviews, profiles) = stores(&f);
        requests
            .expect_save()
            .times(1)
            .withf(|r| r.status == ShadowingStatus::Approved)
            .returning(|r| Ok(r.clone()));
        let mut calendar = MockCalendarBridge::new();
        calendar
            .expect_add_attendee()
            .returning(|_, _, _| Err(Error::Calendar("503".into())));

        let svc = service(requests, interviews, profiles, calendar);
        let approved = svc.approve(f.request.id).await.unwrap();
        assert_eq!(approved.status, ShadowingStatus::Approved);
    }

    #[tokio::test]
    async fn approve_without_event_skips_calendar() {
        let f = fixture(None);
        let (mut requests, interviews, profiles) = stores(&f);
        requests.expect_save().returning(|r| Ok(r.clone()));
        let mut calendar = MockCalendarBridge::new();
        calendar.expect_add_attendee().never();

        let svc = service(requests, interviews, profiles, calendar);
        svc.approve(f.request.id).await.unwrap();
    }

    #[tokio::test]
    async fn second_transition_conflicts() {
        let mut f = fixture(None);
        f.request.approve().unwrap();
        let (mut requests, interviews, profiles) = stores(&f);
        requests.expect_save().never();

        let svc = service(requests, interviews, profiles, MockCalendarBridge::new());
        for result in [
            svc.approve(f.request.id).await,
            svc.cancel(f.request.id).await,
            svc.reject(f.request.id, None).await,
        ] {
            match result {
                Err(Error::InvalidTransition { current }) => {
                    assert_eq!(current, ShadowingStatus::Approved)
                }
                other => panic!("expected conflict, got {:?}", other),
            }
        }
    }

    #[tokio::test]
    async fn reject_stores_reason_verbatim() {
        let f = fixture(None);
        let (mut requests, interviews, profiles) = stores(&f);
        requests.expect_save().returning(|r| Ok(r.clone()));

        let svc = service(requests, interviews, profiles, MockCalendarBridge::new());
        let rejected = svc
            .reject(f.request.id, Some("Too many shadowers".into()))
            .await
            .unwrap();
        assert_eq!(rejected.status, ShadowingStatus::Rejected);
        assert_eq!(rejected.reason.as_deref(), Some("Too many shadowers"));
    }

    #[tokio::test]
    async fn missing_request_is_not_found() {
        let mut requests = MockShadowingRequestStore::new();
        requests.expect_find_by_id().returning(|_| Ok(None));

        let svc = service(
            requests,
            MockInterviewStore::new(),
            MockProfileStore::new(),
            MockCalendarBridge::new(),
        );
        let err = svc.cancel(Uuid::new_v4()).await.unwrap_err();
        assert!(matches!(err, Error::NotFound(_)));
    }
}
