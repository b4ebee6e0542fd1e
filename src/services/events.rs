use std::collections::HashMap;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use uuid::Uuid;

use crate::database::models::{
    Notification, NotificationContext, NotificationType, ReferenceType, Request, User,
};
use crate::database::repositories::UserRepository;
use crate::error::AppError;
use crate::services::notification::NotificationService;

/// Request lifecycle transitions that produce notifications.
#[derive(Debug, Clone)]
pub enum RequestEvent {
    Created {
        request: Request,
    },
    Approved {
        request: Request,
        approver_id: Uuid,
    },
    Rejected {
        request: Request,
        approver_id: Uuid,
    },
    Delegated {
        request: Request,
        delegated_by: Uuid,
    },
}

impl RequestEvent {
    pub fn request(&self) -> &Request {
        match self {
            RequestEvent::Created { request }
            | RequestEvent::Approved { request, .. }
            | RequestEvent::Rejected { request, .. }
            | RequestEvent::Delegated { request, .. } => request,
        }
    }

    pub fn notification_type(&self) -> NotificationType {
        match self {
            RequestEvent::Created { .. } => NotificationType::RequestCreated,
            RequestEvent::Approved { .. } => NotificationType::RequestApproved,
            RequestEvent::Rejected { .. } => NotificationType::RequestRejected,
            RequestEvent::Delegated { .. } => NotificationType::RequestDelegated,
        }
    }

    /// Who gets told about the transition.
    pub fn recipient_id(&self) -> Uuid {
        match self {
            RequestEvent::Created { request } | RequestEvent::Delegated { request, .. } => {
                request.processor_id
            }
            RequestEvent::Approved { request, .. } | RequestEvent::Rejected { request, .. } => {
                request.employee_id
            }
        }
    }

    /// The user who acted; the processor for creation.
    fn actor_id(&self) -> Uuid {
        match self {
            RequestEvent::Created { request } => request.processor_id,
            RequestEvent::Approved { approver_id, .. }
            | RequestEvent::Rejected { approver_id, .. } => *approver_id,
            RequestEvent::Delegated { delegated_by, .. } => *delegated_by,
        }
    }
}

/// Sending half of the lifecycle queue. Publishing never fails the caller.
#[derive(Clone)]
pub struct EventPublisher {
    sender: UnboundedSender<RequestEvent>,
}

impl EventPublisher {
    pub fn publish(&self, event: RequestEvent) {
        let request_id = event.request().id;
        if self.sender.send(event).is_err() {
            log::warn!(
                "Event queue closed, dropping lifecycle event for request {}",
                request_id
            );
        }
    }
}

pub fn event_queue(
    notifications: NotificationService,
    users: UserRepository,
) -> (EventPublisher, NotificationDispatcher) {
    let (sender, receiver) = mpsc::unbounded_channel();
    (
        EventPublisher { sender },
        NotificationDispatcher {
            receiver,
            notifications,
            users,
        },
    )
}

/// Consumes lifecycle events and turns each into one notification.
pub struct NotificationDispatcher {
    receiver: UnboundedReceiver<RequestEvent>,
    notifications: NotificationService,
    users: UserRepository,
}

impl NotificationDispatcher {
    /// Runs until every publisher is dropped.
    pub async fn run(mut self) {
        log::info!("Notification dispatcher started");
        while let Some(event) = self.receiver.recv().await {
            self.dispatch(&event).await;
        }
        log::info!("Notification dispatcher stopped");
    }

    /// Drain whatever is queued right now. Returns how many events were handled.
    pub async fn process_pending(&mut self) -> usize {
        let mut handled = 0;
        while let Ok(event) = self.receiver.try_recv() {
            self.dispatch(&event).await;
            handled += 1;
        }
        handled
    }

    async fn dispatch(&self, event: &RequestEvent) {
        if let Err(e) = self.handle(event).await {
            log::error!(
                "Failed to notify about {} of request {}: {}",
                event.notification_type(),
                event.request().id,
                e
            );
        }
    }

    pub async fn handle(&self, event: &RequestEvent) -> Result<Option<Notification>, AppError> {
        let request = event.request();

        let recipient = self.user(event.recipient_id()).await?;
        let employee = self.user(request.employee_id).await?;
        let processor = self.user(request.processor_id).await?;
        let actor = self.user(event.actor_id()).await?;

        let context = NotificationContext {
            recipient_id: recipient.id,
            recipient_role: recipient.role,
            notification_type: event.notification_type(),
            reference_type: ReferenceType::Request,
            reference_id: request.id,
            data: context_data(request, &employee, &processor, &actor),
        };

        self.notifications.notify(&context).await
    }

    async fn user(&self, id: Uuid) -> Result<User, AppError> {
        self.users
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("User {} not found", id)))
    }
}

fn context_data(
    request: &Request,
    employee: &User,
    processor: &User,
    actor: &User,
) -> HashMap<String, String> {
    let mut data = HashMap::new();
    data.insert("employeeName".to_string(), employee.full_name.clone());
    data.insert("approverName".to_string(), actor.full_name.clone());
    data.insert("processorName".to_string(), processor.full_name.clone());
    data.insert(
        "requestType".to_string(),
        request.request_type.label().to_string(),
    );
    data.insert("startDate".to_string(), request.start_date.to_string());
    data.insert("endDate".to_string(), request.end_date.to_string());
    data.insert(
        "reason".to_string(),
        request.reason.clone().unwrap_or_default(),
    );
    data.insert(
        "rejectionReason".to_string(),
        request.rejection_reason.clone().unwrap_or_default(),
    );
    data.insert("requestId".to_string(), request.id.to_string());
    data
}
