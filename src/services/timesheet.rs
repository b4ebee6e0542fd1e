use chrono::{Datelike, NaiveDate, NaiveTime, Weekday};
use sqlx::SqliteConnection;
use uuid::Uuid;

use crate::config::WorkSchedule;
use crate::database::models::{
    AttendanceStatus, DailyTimeSheet, DayPeriod, Request, RequestType,
};
use crate::database::repositories::TimesheetRepository;
use crate::error::AppError;

const MAX_RANGE_DAYS: i64 = 366;

/// One mutation of a single day's attendance.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttendanceChange {
    Leave(DayPeriod),
    CheckIn(NaiveTime),
    CheckOut(NaiveTime),
}

/// Per-day changes implied by an approved request. Leave skips weekends.
pub fn changes_for(request: &Request) -> Vec<(NaiveDate, AttendanceChange)> {
    match request.request_type {
        RequestType::Leave => {
            let period = request.leave_period.unwrap_or(DayPeriod::FullDay);
            request
                .start_date
                .iter_days()
                .take_while(|day| *day <= request.end_date)
                .filter(|day| !matches!(day.weekday(), Weekday::Sat | Weekday::Sun))
                .map(|day| (day, AttendanceChange::Leave(period)))
                .collect()
        }
        RequestType::CheckIn => request
            .requested_time
            .map(|time| vec![(request.start_date, AttendanceChange::CheckIn(time))])
            .unwrap_or_default(),
        RequestType::CheckOut => request
            .requested_time
            .map(|time| vec![(request.start_date, AttendanceChange::CheckOut(time))])
            .unwrap_or_default(),
    }
}

/// Reject a change that conflicts with what the day already records.
pub fn validate_change(sheet: &DailyTimeSheet, change: &AttendanceChange) -> Result<(), AppError> {
    let date = sheet.work_date;

    if sheet.finalized {
        return Err(AppError::BadRequest(format!(
            "Timesheet for {} is finalized",
            date
        )));
    }

    match *change {
        AttendanceChange::CheckIn(_) | AttendanceChange::CheckOut(_)
            if sheet.is_full_day_leave() =>
        {
            Err(AppError::BadRequest(format!(
                "{} is already a full-day leave",
                date
            )))
        }
        AttendanceChange::Leave(DayPeriod::FullDay)
            if sheet.check_in.is_some() || sheet.check_out.is_some() =>
        {
            Err(AppError::BadRequest(format!(
                "Attendance already recorded for {}",
                date
            )))
        }
        AttendanceChange::CheckIn(time) if sheet.check_out.is_some_and(|out| time >= out) => {
            Err(AppError::BadRequest(format!(
                "Check-in on {} must be before the recorded check-out",
                date
            )))
        }
        AttendanceChange::CheckOut(time) if sheet.check_in.is_some_and(|inn| time <= inn) => {
            Err(AppError::BadRequest(format!(
                "Check-out on {} must be after the recorded check-in",
                date
            )))
        }
        _ => Ok(()),
    }
}

/// Validate, apply and recompute.
pub fn apply_change(
    sheet: &mut DailyTimeSheet,
    change: &AttendanceChange,
    schedule: &WorkSchedule,
) -> Result<(), AppError> {
    validate_change(sheet, change)?;

    match *change {
        AttendanceChange::Leave(period) => {
            if period.covers_morning() {
                sheet.morning_status = AttendanceStatus::Leave;
            }
            if period.covers_afternoon() {
                sheet.afternoon_status = AttendanceStatus::Leave;
            }
        }
        AttendanceChange::CheckIn(time) => sheet.check_in = Some(time),
        AttendanceChange::CheckOut(time) => sheet.check_out = Some(time),
    }

    recompute(sheet, schedule);
    Ok(())
}

fn minutes_after(from: NaiveTime, to: NaiveTime) -> i64 {
    (to - from).num_minutes().max(0)
}

/// Derive half-day statuses, credit and minute counters from the recorded times.
pub fn recompute(sheet: &mut DailyTimeSheet, schedule: &WorkSchedule) {
    let morning_leave = sheet.morning_status == AttendanceStatus::Leave;
    let afternoon_leave = sheet.afternoon_status == AttendanceStatus::Leave;

    if !morning_leave {
        sheet.morning_status = match sheet.check_in {
            Some(time) if time < schedule.lunch_start => AttendanceStatus::Present,
            _ => AttendanceStatus::Absent,
        };
    }

    if !afternoon_leave {
        let checked_in = sheet
            .check_in
            .is_some_and(|time| time < schedule.afternoon_end);
        let checked_out = sheet
            .check_out
            .is_some_and(|time| time > schedule.lunch_end);
        sheet.afternoon_status = if checked_in && checked_out {
            AttendanceStatus::Present
        } else {
            AttendanceStatus::Absent
        };
    }

    let expected_start = if morning_leave {
        schedule.lunch_end
    } else {
        schedule.morning_start
    };
    let expected_end = if afternoon_leave {
        schedule.lunch_start
    } else {
        schedule.afternoon_end
    };

    sheet.late_minutes = sheet
        .check_in
        .map_or(0, |time| minutes_after(expected_start, time));
    sheet.early_leave_minutes = sheet
        .check_out
        .map_or(0, |time| minutes_after(time, expected_end));
    sheet.overtime_minutes = sheet
        .check_out
        .map_or(0, |time| minutes_after(expected_end, time));

    let credited_halves = [sheet.morning_status, sheet.afternoon_status]
        .iter()
        .filter(|status| **status != AttendanceStatus::Absent)
        .count();
    sheet.work_credit = credited_halves as f64 * 0.5;
}

#[derive(Clone)]
pub struct TimesheetService {
    repository: TimesheetRepository,
    schedule: WorkSchedule,
}

impl TimesheetService {
    pub fn new(repository: TimesheetRepository, schedule: WorkSchedule) -> Self {
        Self {
            repository,
            schedule,
        }
    }

    async fn load_day(
        &self,
        conn: &mut SqliteConnection,
        employee_id: Uuid,
        date: NaiveDate,
    ) -> Result<(DailyTimeSheet, bool), AppError> {
        match self.repository.find_by_day(conn, employee_id, date).await? {
            Some(sheet) => Ok((sheet, true)),
            None => Ok((DailyTimeSheet::empty(employee_id, date), false)),
        }
    }

    async fn save_day(
        &self,
        conn: &mut SqliteConnection,
        sheet: &DailyTimeSheet,
        exists: bool,
    ) -> Result<DailyTimeSheet, AppError> {
        if !exists {
            return Ok(self.repository.insert(conn, sheet).await?);
        }

        self.repository
            .update_unfinalized(conn, sheet)
            .await?
            .ok_or_else(|| {
                AppError::BadRequest(format!("Timesheet for {} is finalized", sheet.work_date))
            })
    }

    /// Check a single-day change against the stored day without writing anything.
    pub async fn validate(
        &self,
        employee_id: Uuid,
        date: NaiveDate,
        change: &AttendanceChange,
    ) -> Result<(), AppError> {
        let mut conn = self.repository.acquire().await?;
        let (sheet, _) = self.load_day(&mut conn, employee_id, date).await?;
        validate_change(&sheet, change)
    }

    /// Apply an approved request on the caller's connection (usually the
    /// approval transaction).
    pub async fn apply_request(
        &self,
        conn: &mut SqliteConnection,
        request: &Request,
    ) -> Result<Vec<DailyTimeSheet>, AppError> {
        let mut saved = Vec::new();

        for (date, change) in changes_for(request) {
            let (mut sheet, exists) = self.load_day(conn, request.employee_id, date).await?;
            apply_change(&mut sheet, &change, &self.schedule)?;
            saved.push(self.save_day(conn, &sheet, exists).await?);
        }

        log::debug!(
            "Applied request {} to {} timesheet day(s)",
            request.id,
            saved.len()
        );

        Ok(saved)
    }

    pub async fn list(
        &self,
        employee_id: Uuid,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Vec<DailyTimeSheet>, AppError> {
        if to < from {
            return Err(AppError::BadRequest(
                "'to' must not be before 'from'".to_string(),
            ));
        }
        if (to - from).num_days() > MAX_RANGE_DAYS {
            return Err(AppError::BadRequest(format!(
                "Range cannot exceed {} days",
                MAX_RANGE_DAYS
            )));
        }

        Ok(self.repository.list_range(employee_id, from, to).await?)
    }

    /// Lock a day against further changes, recording an absence when nothing exists yet.
    pub async fn finalize(
        &self,
        employee_id: Uuid,
        date: NaiveDate,
    ) -> Result<DailyTimeSheet, AppError> {
        let mut conn = self.repository.acquire().await?;
        let (mut sheet, exists) = self.load_day(&mut conn, employee_id, date).await?;

        if sheet.finalized {
            return Err(AppError::InvalidState(format!(
                "Timesheet for {} is already finalized",
                date
            )));
        }

        recompute(&mut sheet, &self.schedule);
        sheet.finalized = true;

        let sheet = self.save_day(&mut conn, &sheet, exists).await?;
        log::info!("Finalized timesheet of {} for {}", employee_id, date);

        Ok(sheet)
    }
}
