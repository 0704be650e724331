use std::collections::HashMap;

use time::macros::format_description;
use time::Date;
use tracing::{error, info};
use uuid::Uuid;

use crate::{
    auth::services::is_valid_email,
    error::{ApiError, FieldError},
    response::Pagination,
    services::repo as catalog,
    state::AppState,
};

use super::dto::{
    BookedService, BookingDetails, BookingStatus, CreateBookingRequest, Customer,
    ListBookingsQuery, PaymentStatus, ServiceSummary,
};
use super::repo::{self, BookingFilter, BookingRow, LineItemRow, NewBooking};

pub const DEFAULT_PAGE_LIMIT: i64 = 10;

/// Accepts `YYYY-MM-DD` as well as a full ISO-8601 datetime, of which
/// only the calendar date is kept.
pub fn parse_appointment_date(s: &str) -> Option<Date> {
    let fmt = format_description!("[year]-[month]-[day]");
    Date::parse(s, &fmt)
        .ok()
        .or_else(|| s.get(..10).and_then(|prefix| Date::parse(prefix, &fmt).ok()))
}

/// A creation request with every field checked and parsed. Validation
/// runs before any catalog lookup or persistence.
#[derive(Debug)]
pub struct ValidBooking {
    pub customer: Customer,
    pub service_ids: Vec<Uuid>,
    pub appointment_date: Date,
    pub appointment_time: String,
    pub notes: Option<String>,
}

pub fn validate(req: CreateBookingRequest) -> Result<ValidBooking, Vec<FieldError>> {
    let mut errors = Vec::new();

    if req.customer.name.trim().is_empty() {
        errors.push(FieldError::new("customer.name", "Customer name is required"));
    }
    if !is_valid_email(req.customer.email.trim()) {
        errors.push(FieldError::new("customer.email", "Valid email is required"));
    }
    if req.customer.phone.trim().is_empty() {
        errors.push(FieldError::new("customer.phone", "Phone is required"));
    }
    if req.services.is_empty() {
        errors.push(FieldError::new("services", "At least one service is required"));
    }

    let appointment_date = match req.appointment_date.as_deref().and_then(parse_appointment_date)
    {
        Some(date) => Some(date),
        None => {
            errors.push(FieldError::new("appointmentDate", "Valid date is required"));
            None
        }
    };
    let appointment_time = match req
        .appointment_time
        .as_deref()
        .map(str::trim)
        .filter(|t| !t.is_empty())
    {
        Some(time) => Some(time.to_string()),
        None => {
            errors.push(FieldError::new("appointmentTime", "Time is required"));
            None
        }
    };

    if !errors.is_empty() {
        return Err(errors);
    }

    Ok(ValidBooking {
        customer: Customer {
            name: req.customer.name.trim().to_string(),
            email: req.customer.email.trim().to_string(),
            phone: req.customer.phone.trim().to_string(),
        },
        service_ids: req.services.into_iter().map(|s| s.service).collect(),
        appointment_date: appointment_date.unwrap(),
        appointment_time: appointment_time.unwrap(),
        notes: req.notes,
    })
}

/// Freezes one price per requested service, in request order. The first
/// reference that does not resolve aborts the whole computation.
pub fn freeze_line_items(
    requested: &[Uuid],
    resolved: &[catalog::Service],
) -> Result<(Vec<(Uuid, i64)>, i64), Uuid> {
    let by_id: HashMap<Uuid, &catalog::Service> =
        resolved.iter().map(|s| (s.id, s)).collect();

    let mut line_items = Vec::with_capacity(requested.len());
    let mut total = 0i64;
    for id in requested {
        let service = by_id.get(id).ok_or(*id)?;
        line_items.push((service.id, service.price));
        total += service.price;
    }
    Ok((line_items, total))
}

/// The booking engine's creation algorithm: validate, resolve every
/// reference, freeze prices, persist atomically, then hand off to the
/// mailer without gating the response on delivery.
pub async fn create_booking(
    state: &AppState,
    req: CreateBookingRequest,
) -> Result<BookingDetails, ApiError> {
    let valid = validate(req).map_err(ApiError::Validation)?;

    let resolved = catalog::find_by_ids(&state.db, &valid.service_ids).await?;
    let (line_items, total_amount) = freeze_line_items(&valid.service_ids, &resolved)
        .map_err(|missing| ApiError::BadRequest(format!("Service not found: {missing}")))?;

    let row = repo::insert(
        &state.db,
        &NewBooking {
            customer_name: valid.customer.name,
            customer_email: valid.customer.email,
            customer_phone: valid.customer.phone,
            appointment_date: valid.appointment_date,
            appointment_time: valid.appointment_time,
            total_amount,
            notes: valid.notes,
            line_items,
        },
    )
    .await?;

    let items = repo::line_items(&state.db, &[row.id]).await?;
    let details = assemble(row, &items);

    info!(booking_id = %details.id, total_amount, "booking created");

    // persistence already happened; delivery failures are an operator
    // concern, never the customer's
    let mailer = state.mailer.clone();
    let for_mail = details.clone();
    tokio::spawn(async move {
        if let Err(e) = mailer.send_booking_confirmation(&for_mail).await {
            error!(booking_id = %for_mail.id, error = %e, "booking confirmation email failed");
        }
    });

    Ok(details)
}

pub async fn list_bookings(
    state: &AppState,
    query: ListBookingsQuery,
) -> Result<(Vec<BookingDetails>, Pagination), ApiError> {
    let status = match query.status.as_deref().filter(|s| !s.is_empty()) {
        Some(s) => Some(
            BookingStatus::parse(s)
                .ok_or_else(|| ApiError::BadRequest(format!("Unknown status: {s}")))?,
        ),
        None => None,
    };
    let date = match query.date.as_deref().filter(|d| !d.is_empty()) {
        Some(d) => Some(
            parse_appointment_date(d)
                .ok_or_else(|| ApiError::BadRequest(format!("Invalid date: {d}")))?,
        ),
        None => None,
    };

    let page = query.page.unwrap_or(1).max(1);
    let limit = query.limit.unwrap_or(DEFAULT_PAGE_LIMIT).clamp(1, 100);
    let filter = BookingFilter {
        status: status.map(|s| s.as_str().to_string()),
        date,
        limit,
        offset: (page - 1) * limit,
    };

    let rows = repo::list(&state.db, &filter).await?;
    let total = repo::count(&state.db, &filter).await?;

    let ids: Vec<Uuid> = rows.iter().map(|r| r.id).collect();
    let items = repo::line_items(&state.db, &ids).await?;
    let bookings = rows.into_iter().map(|row| assemble(row, &items)).collect();

    Ok((bookings, Pagination::new(page, limit, total)))
}

/// Most recently created bookings, resolved for display.
pub async fn recent_bookings(
    state: &AppState,
    limit: i64,
) -> Result<Vec<BookingDetails>, ApiError> {
    let filter = BookingFilter {
        limit,
        ..Default::default()
    };
    let rows = repo::list(&state.db, &filter).await?;
    let ids: Vec<Uuid> = rows.iter().map(|r| r.id).collect();
    let items = repo::line_items(&state.db, &ids).await?;
    Ok(rows.into_iter().map(|row| assemble(row, &items)).collect())
}

/// No transition graph is enforced; any status may replace any other,
/// including itself.
pub async fn update_status(
    state: &AppState,
    id: Uuid,
    status: BookingStatus,
) -> Result<BookingDetails, ApiError> {
    let row = repo::update_status(&state.db, id, status.as_str())
        .await?
        .ok_or(ApiError::NotFound("Booking"))?;

    let items = repo::line_items(&state.db, &[row.id]).await?;
    info!(booking_id = %id, status = status.as_str(), "booking status updated");
    Ok(assemble(row, &items))
}

fn assemble(row: BookingRow, items: &[LineItemRow]) -> BookingDetails {
    let services = items
        .iter()
        .filter(|item| item.booking_id == row.id)
        .map(|item| BookedService {
            service: ServiceSummary {
                id: item.service_id,
                title: item.title.clone(),
                price: item.current_price,
                duration_minutes: item.duration_minutes,
                category: item.category.clone(),
            },
            price: item.price_at_booking,
        })
        .collect();

    BookingDetails {
        id: row.id,
        customer: Customer {
            name: row.customer_name,
            email: row.customer_email,
            phone: row.customer_phone,
        },
        services,
        appointment_date: row.appointment_date,
        appointment_time: row.appointment_time,
        total_amount: row.total_amount,
        status: BookingStatus::parse(&row.status).unwrap_or(BookingStatus::Pending),
        payment_status: PaymentStatus::parse(&row.payment_status)
            .unwrap_or(PaymentStatus::Pending),
        notes: row.notes,
        created_at: row.created_at,
        updated_at: row.updated_at,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bookings::dto::ServiceRefInput;
    use time::macros::date;
    use time::OffsetDateTime;

    fn request(
        name: &str,
        email: &str,
        phone: &str,
        services: Vec<Uuid>,
        date: Option<&str>,
        time: Option<&str>,
    ) -> CreateBookingRequest {
        CreateBookingRequest {
            customer: Customer {
                name: name.into(),
                email: email.into(),
                phone: phone.into(),
            },
            services: services
                .into_iter()
                .map(|service| ServiceRefInput { service })
                .collect(),
            appointment_date: date.map(String::from),
            appointment_time: time.map(String::from),
            notes: None,
        }
    }

    fn catalog_service(price: i64) -> catalog::Service {
        catalog::Service {
            id: Uuid::new_v4(),
            title: "Bridal Makeup".into(),
            description: "Complete bridal transformation".into(),
            price,
            duration_minutes: 180,
            icon: "lips".into(),
            category: "makeup".into(),
            images: vec![],
            is_active: true,
            created_at: OffsetDateTime::now_utc(),
            updated_at: OffsetDateTime::now_utc(),
        }
    }

    #[test]
    fn valid_request_passes_and_is_trimmed() {
        let req = request(
            " Asha ",
            " asha@example.com ",
            "+91 90000 00000",
            vec![Uuid::new_v4()],
            Some("2025-03-10"),
            Some("10:00 AM"),
        );
        let valid = validate(req).expect("should validate");
        assert_eq!(valid.customer.name, "Asha");
        assert_eq!(valid.customer.email, "asha@example.com");
        assert_eq!(valid.appointment_date, date!(2025 - 03 - 10));
        assert_eq!(valid.appointment_time, "10:00 AM");
    }

    #[test]
    fn missing_fields_report_per_field_errors() {
        let req = request("", "not-an-email", "", vec![], None, None);
        let errors = validate(req).unwrap_err();
        let fields: Vec<&str> = errors.iter().map(|e| e.field).collect();
        assert!(fields.contains(&"customer.name"));
        assert!(fields.contains(&"customer.email"));
        assert!(fields.contains(&"customer.phone"));
        assert!(fields.contains(&"services"));
        assert!(fields.contains(&"appointmentDate"));
        assert!(fields.contains(&"appointmentTime"));
    }

    #[test]
    fn one_bad_field_does_not_hide_the_rest() {
        let req = request(
            "Asha",
            "asha@example.com",
            "+91 90000 00000",
            vec![Uuid::new_v4()],
            Some("March 10th"),
            Some("10:00 AM"),
        );
        let errors = validate(req).unwrap_err();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].field, "appointmentDate");
    }

    #[test]
    fn datetime_strings_keep_only_the_calendar_date() {
        assert_eq!(
            parse_appointment_date("2025-03-10T14:30:00Z"),
            Some(date!(2025 - 03 - 10))
        );
        assert_eq!(parse_appointment_date("2025-03-10"), Some(date!(2025 - 03 - 10)));
        assert_eq!(parse_appointment_date("10/03/2025"), None);
        assert_eq!(parse_appointment_date(""), None);
    }

    #[test]
    fn total_is_exact_sum_of_current_prices() {
        let bridal = catalog_service(15000);
        let hair = catalog_service(4000);
        let requested = vec![bridal.id, hair.id];
        let (items, total) =
            freeze_line_items(&requested, &[bridal.clone(), hair.clone()]).expect("all resolve");
        assert_eq!(total, 19000);
        assert_eq!(items, vec![(bridal.id, 15000), (hair.id, 4000)]);
    }

    #[test]
    fn duplicate_references_are_each_priced() {
        let mehndi = catalog_service(5000);
        let requested = vec![mehndi.id, mehndi.id];
        let (items, total) = freeze_line_items(&requested, &[mehndi.clone()]).expect("resolves");
        assert_eq!(total, 10000);
        assert_eq!(items.len(), 2);
    }

    #[test]
    fn inactive_services_still_price_at_current_value() {
        let mut retired = catalog_service(8000);
        retired.is_active = false;
        let requested = vec![retired.id];
        let (_, total) = freeze_line_items(&requested, &[retired]).expect("resolves");
        assert_eq!(total, 8000);
    }

    #[test]
    fn unresolved_reference_aborts_and_names_the_id() {
        let bridal = catalog_service(15000);
        let ghost = Uuid::new_v4();
        let requested = vec![bridal.id, ghost];
        let missing = freeze_line_items(&requested, &[bridal]).unwrap_err();
        assert_eq!(missing, ghost);
    }

    #[test]
    fn line_items_keep_request_order() {
        let first = catalog_service(100);
        let second = catalog_service(200);
        let requested = vec![second.id, first.id];
        let (items, _) =
            freeze_line_items(&requested, &[first.clone(), second.clone()]).expect("resolves");
        assert_eq!(items[0].0, second.id);
        assert_eq!(items[1].0, first.id);
    }
}
