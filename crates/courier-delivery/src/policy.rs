//! Per-event-type channel routing policy.
//!
//! A fixed lookup table: each event type maps to an ordered list of
//! real-time channels, most preferred first. Inbox is never part of the
//! ranked list — it is the orchestrator's terminal step, not an eligible
//! escalation target.

use courier_types::models::{Channel, EventType};

/// Default ordering for event types without a dedicated route (the open
/// `Other` variant).
pub const DEFAULT_ROUTE: &[Channel] = &[Channel::Email, Channel::Push];

/// Ranked real-time channels for an event type, most preferred first.
pub fn ranked_channels(event_type: &EventType) -> &'static [Channel] {
    match event_type {
        EventType::Otp => &[Channel::Sms, Channel::Email, Channel::Push],
        EventType::TransactionOtp => &[Channel::Sms, Channel::WhatsApp, Channel::Email],
        EventType::FraudAlert => &[Channel::Push, Channel::Sms, Channel::Email],
        EventType::MonthlyStatement => &[Channel::Email, Channel::Push],
        EventType::PaymentConfirmation => &[Channel::Email, Channel::Push, Channel::WhatsApp],
        EventType::Other(_) => DEFAULT_ROUTE,
    }
}

/// Full route for a send: the ranked list, with an intended-channel
/// override promoted to primary when the policy allows it for this event
/// type. An override outside the ranked list (or Inbox) is auto-corrected
/// by falling back to the default ordering. The returned route is never
/// empty.
pub fn route_for(event_type: &EventType, intended: Option<Channel>) -> Vec<Channel> {
    let ranked = ranked_channels(event_type);
    match intended {
        Some(ch) if ch != Channel::Inbox && ranked.contains(&ch) => {
            let mut route = Vec::with_capacity(ranked.len());
            route.push(ch);
            route.extend(ranked.iter().copied().filter(|&c| c != ch));
            route
        }
        _ => ranked.to_vec(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn otp_class_events_lead_with_sms() {
        assert_eq!(
            ranked_channels(&EventType::Otp)[0],
            Channel::Sms,
        );
        assert_eq!(ranked_channels(&EventType::TransactionOtp)[0], Channel::Sms);
    }

    #[test]
    fn statement_class_events_lead_with_email() {
        assert_eq!(ranked_channels(&EventType::MonthlyStatement)[0], Channel::Email);
        assert_eq!(
            ranked_channels(&EventType::PaymentConfirmation)[0],
            Channel::Email
        );
    }

    #[test]
    fn unknown_event_type_uses_default_route() {
        let et = EventType::Other("Loan Reminder".to_string());
        assert_eq!(ranked_channels(&et), DEFAULT_ROUTE);
    }

    #[test]
    fn no_route_contains_inbox() {
        for et in [
            EventType::Otp,
            EventType::TransactionOtp,
            EventType::FraudAlert,
            EventType::MonthlyStatement,
            EventType::PaymentConfirmation,
            EventType::Other("x".to_string()),
        ] {
            assert!(!ranked_channels(&et).contains(&Channel::Inbox));
            assert!(!ranked_channels(&et).is_empty());
        }
    }

    #[test]
    fn override_promotes_allowed_channel() {
        let route = route_for(&EventType::Otp, Some(Channel::Push));
        assert_eq!(route, vec![Channel::Push, Channel::Sms, Channel::Email]);
    }

    #[test]
    fn override_outside_route_is_auto_corrected() {
        let route = route_for(&EventType::MonthlyStatement, Some(Channel::WhatsApp));
        assert_eq!(route, vec![Channel::Email, Channel::Push]);
    }

    #[test]
    fn inbox_override_is_ignored() {
        let route = route_for(&EventType::Otp, Some(Channel::Inbox));
        assert_eq!(route, vec![Channel::Sms, Channel::Email, Channel::Push]);
    }
}
