use uuid::Uuid;

use crate::database::models::{
    CreateRequestInput, DayPeriod, Request, RequestStatus, RequestType, Role, User,
};
use crate::database::repositories::{NewRequest, RequestRepository, UserRepository};
use crate::error::AppError;
use crate::services::events::{EventPublisher, RequestEvent};
use crate::services::profile::ProfileService;
use crate::services::timesheet::{AttendanceChange, TimesheetService};

fn concurrent_modification(id: Uuid) -> AppError {
    AppError::InvalidState(format!("Request {} was modified concurrently", id))
}

// SQLITE_BUSY and SQLITE_LOCKED, including their extended codes
fn is_lock_contention(error: &sqlx::Error) -> bool {
    match error {
        sqlx::Error::Database(db) => db
            .code()
            .and_then(|code| code.parse::<i32>().ok())
            .is_some_and(|code| matches!(code & 0xff, 5 | 6)),
        _ => false,
    }
}

/// Lost the write lock to another decision on the same request.
fn contended(id: Uuid) -> impl FnOnce(sqlx::Error) -> AppError {
    move |error| {
        if is_lock_contention(&error) {
            log::warn!("Request {} is locked by another writer: {}", id, error);
            concurrent_modification(id)
        } else {
            error.into()
        }
    }
}

fn not_pending(request: &Request) -> AppError {
    AppError::InvalidState(format!(
        "Request {} is {}, only pending requests can be processed",
        request.id, request.status
    ))
}

/// Leave and attendance requests from creation to approval.
#[derive(Clone)]
pub struct RequestService {
    requests: RequestRepository,
    users: UserRepository,
    profiles: ProfileService,
    timesheets: TimesheetService,
    events: EventPublisher,
}

impl RequestService {
    pub fn new(
        requests: RequestRepository,
        users: UserRepository,
        profiles: ProfileService,
        timesheets: TimesheetService,
        events: EventPublisher,
    ) -> Self {
        Self {
            requests,
            users,
            profiles,
            timesheets,
            events,
        }
    }

    async fn user(&self, id: Uuid) -> Result<User, AppError> {
        self.users
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("User {} not found", id)))
    }

    async fn load(&self, id: Uuid) -> Result<Request, AppError> {
        self.requests
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Request {} not found", id)))
    }

    pub async fn create(
        &self,
        employee_id: Uuid,
        input: CreateRequestInput,
    ) -> Result<Request, AppError> {
        let employee = self.user(employee_id).await?;
        let start_date = input.start_date;
        let mut end_date = input.end_date.unwrap_or(start_date);

        if end_date < start_date {
            return Err(AppError::BadRequest(
                "End date must not be before start date".to_string(),
            ));
        }

        let (leave_period, requested_time) = match input.request_type {
            RequestType::Leave => {
                let period = input.leave_period.unwrap_or(DayPeriod::FullDay);
                if period != DayPeriod::FullDay && start_date != end_date {
                    return Err(AppError::BadRequest(
                        "Half-day leave must cover a single day".to_string(),
                    ));
                }

                let overlapping = self
                    .requests
                    .find_overlapping_leaves(employee.id, start_date, end_date)
                    .await?;
                if let Some(existing) = overlapping.first() {
                    return Err(AppError::BadRequest(format!(
                        "Leave overlaps request {} ({} to {})",
                        existing.id, existing.start_date, existing.end_date
                    )));
                }

                (Some(period), None)
            }
            RequestType::CheckIn | RequestType::CheckOut => {
                let time = input.requested_time.ok_or_else(|| {
                    AppError::BadRequest("Requested time is required".to_string())
                })?;
                end_date = start_date;

                let change = if input.request_type == RequestType::CheckIn {
                    AttendanceChange::CheckIn(time)
                } else {
                    AttendanceChange::CheckOut(time)
                };
                self.timesheets
                    .validate(employee.id, start_date, &change)
                    .await?;

                (None, Some(time))
            }
        };

        let processor = self.resolve_processor(&employee, input.processor_id).await?;

        let request = self
            .requests
            .create_request(NewRequest {
                employee_id: employee.id,
                processor_id: processor.id,
                request_type: input.request_type,
                start_date,
                end_date,
                leave_period,
                requested_time,
                reason: input.reason.filter(|reason| !reason.trim().is_empty()),
            })
            .await?;

        log::info!(
            "Request {} ({}) created by {} for processor {}",
            request.id,
            request.request_type,
            employee.id,
            processor.id
        );

        self.events.publish(RequestEvent::Created {
            request: request.clone(),
        });

        Ok(request)
    }

    async fn resolve_processor(
        &self,
        employee: &User,
        explicit: Option<Uuid>,
    ) -> Result<User, AppError> {
        if let Some(processor_id) = explicit {
            let processor = self
                .users
                .find_by_id(processor_id)
                .await?
                .ok_or_else(|| AppError::BadRequest("Processor not found".to_string()))?;

            if processor.id == employee.id {
                return Err(AppError::BadRequest(
                    "Cannot process your own request".to_string(),
                ));
            }
            if !processor.role.can_process_requests() {
                return Err(AppError::BadRequest(
                    "Processor must be a manager, HR or administrator".to_string(),
                ));
            }
            return Ok(processor);
        }

        match self.profiles.department_manager_of(employee).await? {
            Some(manager) if manager.id != employee.id && manager.role.can_process_requests() => {
                Ok(manager)
            }
            _ => Err(AppError::BadRequest(
                "No processor available: choose one explicitly".to_string(),
            )),
        }
    }

    pub async fn approve(&self, request_id: Uuid, approver_id: Uuid) -> Result<Request, AppError> {
        let request = self.load(request_id).await?;
        if !request.is_pending() {
            return Err(not_pending(&request));
        }
        let approver = self.user(approver_id).await?;
        ensure_processor_or_admin(&request, &approver)?;

        let mut tx = self.requests.begin().await.map_err(contended(request.id))?;
        self.timesheets.apply_request(&mut tx, &request).await?;
        let approved = self
            .requests
            .transition_status(
                &mut tx,
                request.id,
                request.version,
                RequestStatus::Approved,
                None,
            )
            .await?
            .ok_or_else(|| concurrent_modification(request.id))?;
        tx.commit().await.map_err(contended(request.id))?;

        log::info!("Request {} approved by {}", approved.id, approver.id);

        self.events.publish(RequestEvent::Approved {
            request: approved.clone(),
            approver_id: approver.id,
        });

        Ok(approved)
    }

    pub async fn reject(
        &self,
        request_id: Uuid,
        rejecter_id: Uuid,
        reason: &str,
    ) -> Result<Request, AppError> {
        let reason = reason.trim();
        if reason.is_empty() {
            return Err(AppError::BadRequest(
                "A rejection reason is required".to_string(),
            ));
        }

        let request = self.load(request_id).await?;
        if !request.is_pending() {
            return Err(not_pending(&request));
        }
        let rejecter = self.user(rejecter_id).await?;
        ensure_processor_or_admin(&request, &rejecter)?;

        let mut tx = self.requests.begin().await.map_err(contended(request.id))?;
        let rejected = self
            .requests
            .transition_status(
                &mut tx,
                request.id,
                request.version,
                RequestStatus::Rejected,
                Some(reason),
            )
            .await?
            .ok_or_else(|| concurrent_modification(request.id))?;
        tx.commit().await.map_err(contended(request.id))?;

        log::info!("Request {} rejected by {}", rejected.id, rejecter.id);

        self.events.publish(RequestEvent::Rejected {
            request: rejected.clone(),
            approver_id: rejecter.id,
        });

        Ok(rejected)
    }

    pub async fn delegate(
        &self,
        request_id: Uuid,
        actor_id: Uuid,
        new_processor_id: Uuid,
    ) -> Result<Request, AppError> {
        let request = self.load(request_id).await?;

        let target = self
            .users
            .find_by_id(new_processor_id)
            .await?
            .ok_or_else(|| AppError::BadRequest("Delegation target not found".to_string()))?;
        if !target.role.can_receive_delegation() {
            return Err(AppError::BadRequest(
                "Requests can only be delegated to HR or administrators".to_string(),
            ));
        }
        if target.id == request.employee_id {
            return Err(AppError::BadRequest(
                "Cannot delegate a request to its own employee".to_string(),
            ));
        }
        if target.id == request.processor_id {
            return Err(AppError::BadRequest(format!(
                "Request {} is already assigned to {}",
                request.id, target.id
            )));
        }

        if !request.is_pending() {
            return Err(not_pending(&request));
        }
        let actor = self.user(actor_id).await?;
        if actor.id != request.processor_id && !actor.role.is_hr_or_admin() {
            return Err(AppError::Forbidden(
                "Only the current processor, HR or an administrator can delegate".to_string(),
            ));
        }

        let mut tx = self.requests.begin().await.map_err(contended(request.id))?;
        let delegated = self
            .requests
            .reassign_processor(&mut tx, request.id, request.version, target.id)
            .await?
            .ok_or_else(|| concurrent_modification(request.id))?;
        tx.commit().await.map_err(contended(request.id))?;

        log::info!(
            "Request {} delegated from {} to {} by {}",
            delegated.id,
            request.processor_id,
            target.id,
            actor.id
        );

        self.events.publish(RequestEvent::Delegated {
            request: delegated.clone(),
            delegated_by: actor.id,
        });

        Ok(delegated)
    }

    pub async fn cancel(&self, request_id: Uuid, employee_id: Uuid) -> Result<Request, AppError> {
        let request = self.load(request_id).await?;
        if request.employee_id != employee_id {
            return Err(AppError::Forbidden(
                "Only the requesting employee can cancel".to_string(),
            ));
        }
        if !request.is_pending() {
            return Err(not_pending(&request));
        }

        let mut tx = self.requests.begin().await.map_err(contended(request.id))?;
        let cancelled = self
            .requests
            .transition_status(
                &mut tx,
                request.id,
                request.version,
                RequestStatus::Cancelled,
                None,
            )
            .await?
            .ok_or_else(|| concurrent_modification(request.id))?;
        tx.commit().await.map_err(contended(request.id))?;

        log::info!("Request {} cancelled", cancelled.id);

        Ok(cancelled)
    }

    pub async fn get(&self, request_id: Uuid, viewer_id: Uuid) -> Result<Request, AppError> {
        let request = self.load(request_id).await?;
        if request.employee_id == viewer_id || request.processor_id == viewer_id {
            return Ok(request);
        }

        let viewer = self.user(viewer_id).await?;
        if viewer.role.is_hr_or_admin() {
            Ok(request)
        } else {
            Err(AppError::Forbidden(
                "Cannot view another employee's request".to_string(),
            ))
        }
    }

    pub async fn list_mine(&self, employee_id: Uuid) -> Result<Vec<Request>, AppError> {
        Ok(self.requests.list_by_employee(employee_id).await?)
    }

    pub async fn list_assigned(
        &self,
        processor_id: Uuid,
        status: Option<RequestStatus>,
    ) -> Result<Vec<Request>, AppError> {
        Ok(self.requests.list_by_processor(processor_id, status).await?)
    }
}

fn ensure_processor_or_admin(request: &Request, actor: &User) -> Result<(), AppError> {
    if actor.id == request.processor_id || actor.role == Role::Admin {
        Ok(())
    } else {
        Err(AppError::Forbidden(
            "Only the assigned processor or an administrator can decide this request".to_string(),
        ))
    }
}
