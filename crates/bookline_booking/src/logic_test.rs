#[cfg(test)]
mod tests {
    use crate::logic::message_fixtures::{
        client_body, confirmation, description, operator_body, sample_booking,
    };
    use crate::logic::{format_date_fr, overlaps};
    use chrono::{Duration, TimeZone, Utc};

    #[test]
    fn test_overlaps_detects_containment_and_partial_overlap() {
        let start = Utc.with_ymd_and_hms(2025, 6, 27, 18, 0, 0).unwrap();
        let end = start + Duration::minutes(30);

        // Fully containing interval
        assert!(overlaps(
            &[(start - Duration::hours(1), end + Duration::hours(1))],
            start,
            end
        ));
        // Partial overlap at the front
        assert!(overlaps(
            &[(start - Duration::minutes(15), start + Duration::minutes(5))],
            start,
            end
        ));
        // Partial overlap at the back
        assert!(overlaps(
            &[(end - Duration::minutes(5), end + Duration::minutes(15))],
            start,
            end
        ));
    }

    #[test]
    fn test_adjacent_intervals_do_not_overlap() {
        let start = Utc.with_ymd_and_hms(2025, 6, 27, 18, 0, 0).unwrap();
        let end = start + Duration::minutes(30);

        // Busy interval ending exactly at the window start
        assert!(!overlaps(&[(start - Duration::hours(1), start)], start, end));
        // Busy interval starting exactly at the window end
        assert!(!overlaps(&[(end, end + Duration::hours(1))], start, end));
        assert!(!overlaps(&[], start, end));
    }

    #[test]
    fn test_format_date_fr() {
        let booking = sample_booking();
        assert_eq!(format_date_fr(&booking.start), "27 juin 2025");
    }

    #[test]
    fn test_event_description_mentions_client_details() {
        let booking = sample_booking();
        let text = description(&booking);
        assert!(text.contains("Client: Jean Dupont"));
        assert!(text.contains("Téléphone: +15141234567"));
        assert!(text.contains("Email: Non fourni"));
        assert!(text.contains("Durée : 30 minutes"));
    }

    #[test]
    fn test_client_sms_carries_link_and_schedule() {
        let booking = sample_booking();
        let body = client_body(&booking, "Autoscale AI", "https://meet.google.com/abc");
        assert!(body.contains("Bonjour Jean Dupont"));
        assert!(body.contains("Autoscale AI"));
        assert!(body.contains("27 juin 2025"));
        assert!(body.contains("14:00"));
        assert!(body.contains("https://meet.google.com/abc"));
    }

    #[test]
    fn test_operator_copy_identifies_the_booking() {
        let booking = sample_booking();
        let body = operator_body(&booking);
        assert!(body.starts_with("[COPIE]"));
        assert!(body.contains("Jean Dupont"));
        assert!(body.contains("+15141234567"));
    }

    #[test]
    fn test_confirmation_message_is_complete() {
        let booking = sample_booking();
        let message = confirmation(&booking);
        assert!(message.contains("Jean Dupont"));
        assert!(message.contains("27 juin 2025"));
        assert!(message.contains("14:00"));
        assert!(message.contains("+15141234567"));
    }
}
