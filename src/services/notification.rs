use moka::future::Cache;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use uuid::Uuid;

use crate::database::models::{
    Notification, NotificationContext, NotificationTemplate, NotificationTemplateInput,
    NotificationType, Role,
};
use crate::database::repositories::{NotificationRepository, NotificationTemplateRepository};
use crate::error::AppError;
use crate::services::delivery::DeliveryChannel;
use crate::services::template::render;

const DEFAULT_PAGE_SIZE: i64 = 20;
const MAX_PAGE_SIZE: i64 = 100;

// generation, type, recipient role
type TemplateKey = (u64, NotificationType, Role);

/// Renders, stores and pushes notifications.
#[derive(Clone)]
pub struct NotificationService {
    repository: NotificationRepository,
    template_repository: NotificationTemplateRepository,
    // resolved template (after role fallback) per recipient role
    templates: Cache<TemplateKey, Option<NotificationTemplate>>,
    // bumped on every upsert so loads that started earlier land under a dead key
    generation: Arc<AtomicU64>,
    channels: Vec<Arc<dyn DeliveryChannel>>,
}

impl NotificationService {
    pub fn new(
        repository: NotificationRepository,
        template_repository: NotificationTemplateRepository,
        template_ttl_secs: u64,
    ) -> Self {
        let templates = Cache::builder()
            .max_capacity(256)
            .time_to_live(Duration::from_secs(template_ttl_secs))
            .build();

        Self {
            repository,
            template_repository,
            templates,
            generation: Arc::new(AtomicU64::new(0)),
            channels: Vec::new(),
        }
    }

    pub fn with_channel(mut self, channel: Arc<dyn DeliveryChannel>) -> Self {
        self.channels.push(channel);
        self
    }

    /// Role-specific template first, then the one without a role.
    pub async fn resolve_template(
        &self,
        notification_type: NotificationType,
        role: Role,
    ) -> Result<Option<NotificationTemplate>, AppError> {
        let key = (
            self.generation.load(Ordering::Acquire),
            notification_type,
            role,
        );

        self.templates
            .try_get_with(key, async {
                match self
                    .template_repository
                    .find_active(notification_type, Some(role))
                    .await?
                {
                    Some(template) => Ok::<_, sqlx::Error>(Some(template)),
                    None => {
                        self.template_repository
                            .find_active(notification_type, None)
                            .await
                    }
                }
            })
            .await
            .map_err(|e: Arc<sqlx::Error>| {
                log::error!("Failed to load {} template: {}", notification_type, e);
                AppError::internal_server_error_message("Failed to load notification template")
            })
    }

    /// Render and persist. `None` when no active template exists for the type.
    pub async fn create_notification(
        &self,
        context: &NotificationContext,
    ) -> Result<Option<Notification>, AppError> {
        let Some(template) = self
            .resolve_template(context.notification_type, context.recipient_role)
            .await?
        else {
            log::warn!(
                "No active template for {} (role {}), notification skipped",
                context.notification_type,
                context.recipient_role
            );
            return Ok(None);
        };

        let title = render(&template.title_template, &context.data);
        let message = render(&template.message_template, &context.data);

        let notification = self.repository.create(context, &title, &message).await?;
        log::debug!(
            "Stored {} notification {} for {}",
            notification.notification_type,
            notification.id,
            notification.recipient_id
        );

        Ok(Some(notification))
    }

    /// Hand a stored notification to every channel. Channel failures are logged;
    /// the stored copy stays readable from the inbox.
    pub fn send_notification(&self, notification: &Notification) {
        for channel in &self.channels {
            if let Err(e) = channel.deliver(notification) {
                log::warn!(
                    "{} delivery of notification {} failed: {}",
                    channel.name(),
                    notification.id,
                    e
                );
            }
        }
    }

    pub async fn notify(
        &self,
        context: &NotificationContext,
    ) -> Result<Option<Notification>, AppError> {
        let notification = self.create_notification(context).await?;
        if let Some(notification) = &notification {
            self.send_notification(notification);
        }
        Ok(notification)
    }

    pub async fn list(
        &self,
        recipient_id: Uuid,
        limit: Option<i64>,
        offset: Option<i64>,
    ) -> Result<Vec<Notification>, AppError> {
        let limit = limit.unwrap_or(DEFAULT_PAGE_SIZE).clamp(1, MAX_PAGE_SIZE);
        let offset = offset.unwrap_or(0).max(0);

        Ok(self
            .repository
            .list_for_recipient(recipient_id, limit, offset)
            .await?)
    }

    pub async fn unread_count(&self, recipient_id: Uuid) -> Result<i64, AppError> {
        Ok(self.repository.count_unread(recipient_id).await?)
    }

    /// Idempotent; only the recipient may mark a notification.
    pub async fn mark_as_read(&self, id: Uuid, user_id: Uuid) -> Result<Notification, AppError> {
        let notification = self
            .repository
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Notification {} not found", id)))?;

        if notification.recipient_id != user_id {
            return Err(AppError::Forbidden(
                "Notification belongs to another user".to_string(),
            ));
        }
        if notification.is_read {
            return Ok(notification);
        }

        self.repository
            .mark_as_read(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Notification {} not found", id)))
    }

    pub async fn mark_all_read(&self, user_id: Uuid) -> Result<u64, AppError> {
        let updated = self.repository.mark_all_as_read(user_id).await?;
        log::debug!("Marked {} notification(s) read for {}", updated, user_id);
        Ok(updated)
    }

    pub async fn list_templates(&self) -> Result<Vec<NotificationTemplate>, AppError> {
        Ok(self.template_repository.list().await?)
    }

    pub async fn upsert_template(
        &self,
        input: NotificationTemplateInput,
    ) -> Result<NotificationTemplate, AppError> {
        if input.title_template.trim().is_empty() || input.message_template.trim().is_empty() {
            return Err(AppError::BadRequest(
                "Template title and message are required".to_string(),
            ));
        }

        let template = self.template_repository.upsert(&input).await?;

        // a role-less template can change the fallback for every role
        self.generation.fetch_add(1, Ordering::AcqRel);
        self.templates.invalidate_all();
        log::info!(
            "Template {} for role {:?} saved",
            template.notification_type,
            template.role
        );

        Ok(template)
    }
}
