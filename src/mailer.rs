use anyhow::Context;
use axum::async_trait;
use lettre::{
    message::{header::ContentType, Mailbox},
    transport::smtp::authentication::Credentials,
    AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor,
};
use time::macros::format_description;

use crate::bookings::dto::BookingDetails;
use crate::config::SmtpConfig;

/// Outbound notification collaborator. Booking creation hands the
/// populated booking over and never waits on delivery; failures are
/// logged by the caller, not surfaced to the customer.
#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send_booking_confirmation(&self, booking: &BookingDetails) -> anyhow::Result<()>;
}

pub struct SmtpMailer {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    from: Mailbox,
}

impl SmtpMailer {
    pub fn new(cfg: &SmtpConfig) -> anyhow::Result<Self> {
        let transport = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&cfg.host)
            .context("smtp relay")?
            .port(cfg.port)
            .credentials(Credentials::new(cfg.username.clone(), cfg.password.clone()))
            .build();
        let from = format!("{} <{}>", cfg.from_name, cfg.from_email)
            .parse()
            .context("smtp from address")?;
        Ok(Self { transport, from })
    }
}

#[async_trait]
impl Mailer for SmtpMailer {
    async fn send_booking_confirmation(&self, booking: &BookingDetails) -> anyhow::Result<()> {
        let to: Mailbox = booking
            .customer
            .email
            .parse()
            .context("customer email address")?;
        let message = Message::builder()
            .from(self.from.clone())
            .to(to)
            .subject("Booking Confirmation - Blushbook Studio")
            .header(ContentType::TEXT_HTML)
            .body(confirmation_body(booking))
            .context("build confirmation email")?;
        self.transport
            .send(message)
            .await
            .context("send confirmation email")?;
        Ok(())
    }
}

/// HTML body of the confirmation email. The booking arrives with service
/// titles and frozen prices already resolved.
pub fn confirmation_body(booking: &BookingDetails) -> String {
    let date_fmt = format_description!("[year]-[month]-[day]");
    let date = booking
        .appointment_date
        .format(&date_fmt)
        .unwrap_or_else(|_| booking.appointment_date.to_string());

    let items: String = booking
        .services
        .iter()
        .map(|item| format!("<li>{} - {}</li>", item.service.title, item.price))
        .collect();

    format!(
        "<h2>Booking Under Review</h2>\
         <p>Dear {name},</p>\
         <p>Thank you for your booking request with Blushbook Studio. We have received \
         your request for <strong>{date}</strong> at <strong>{time}</strong>.</p>\
         <p><strong>Services Requested:</strong></p>\
         <ul>{items}</ul>\
         <p><strong>Total Amount:</strong> {total}</p>\
         <p>Our team is currently reviewing our availability for the scheduled date. \
         We will get back to you shortly with a confirmation.</p>\
         <p>Best regards,<br>The Blushbook Studio Team</p>",
        name = booking.customer.name,
        date = date,
        time = booking.appointment_time,
        items = items,
        total = booking.total_amount,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bookings::dto::{BookedService, BookingStatus, Customer, PaymentStatus, ServiceSummary};
    use time::macros::date;
    use time::OffsetDateTime;
    use uuid::Uuid;

    fn sample_booking() -> BookingDetails {
        BookingDetails {
            id: Uuid::new_v4(),
            customer: Customer {
                name: "Asha".into(),
                email: "asha@example.com".into(),
                phone: "+91 90000 00000".into(),
            },
            services: vec![BookedService {
                service: ServiceSummary {
                    id: Uuid::new_v4(),
                    title: "Bridal Makeup".into(),
                    price: 15000,
                    duration_minutes: 180,
                    category: "makeup".into(),
                },
                price: 15000,
            }],
            appointment_date: date!(2025 - 03 - 10),
            appointment_time: "10:00 AM".into(),
            total_amount: 15000,
            status: BookingStatus::Pending,
            payment_status: PaymentStatus::Pending,
            notes: None,
            created_at: OffsetDateTime::now_utc(),
            updated_at: OffsetDateTime::now_utc(),
        }
    }

    #[test]
    fn body_includes_schedule_services_and_total() {
        let body = confirmation_body(&sample_booking());
        assert!(body.contains("Dear Asha,"));
        assert!(body.contains("<strong>2025-03-10</strong>"));
        assert!(body.contains("10:00 AM"));
        assert!(body.contains("<li>Bridal Makeup - 15000</li>"));
        assert!(body.contains("<strong>Total Amount:</strong> 15000"));
    }
}
