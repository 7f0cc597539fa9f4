//! Raw record to typed model transforms.

use serde::Serialize;
use serde_json::{Map, Value};

use channels_json::Timestamp;

use crate::domain::models::{
    Customer, ElectronicChannels, EmailChannel, PersonalCustomerAdditionalInfo,
    PersonalCustomerIdentification, PhoneChannel, PhoneChannels, SmsChannel, SocialMediaChannel,
    WebChannel,
};
use crate::domain::ports::RawRecord;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TransformError {
    #[error("invalid payload structure")]
    InvalidPayload,
}

/// Maps one decoded object line to the model published downstream.
pub trait RecordTransform: Send + Sync {
    type Output: Serialize + Send;

    /// # Errors
    /// Returns [`TransformError`] when the record does not have the expected shape.
    fn transform(&self, record: &RawRecord) -> Result<Self::Output, TransformError>;
}

/// Builds [`ElectronicChannels`] from `payload.BOPERS_*_CHANNEL` sections.
///
/// `payload` must be an object. Sections and fields that are absent or not of
/// the expected type are left empty.
#[derive(Debug, Clone, Copy, Default)]
pub struct ElectronicChannelsTransform;

impl RecordTransform for ElectronicChannelsTransform {
    type Output = ElectronicChannels;

    fn transform(&self, record: &RawRecord) -> Result<ElectronicChannels, TransformError> {
        let payload = payload(record)?;

        let web = section(payload, "BOPERS_WEB_CHANNEL");
        let email = section(payload, "BOPERS_EMAIL_CHANNEL");
        let social = section(payload, "BOPERS_SOCIAL_MEDIA_CHANNEL");

        Ok(ElectronicChannels {
            web_channel: WebChannel {
                web_channel_type: text(web, "WEB_CHANNEL_TYPE"),
                web_url_address: text(web, "WEB_URL_ADDRESS"),
                web_available_services: text(web, "WEB_AVAILABLE_SERVICES"),
                web_attention_hours: text(web, "WEB_ATTENTION_HOURS"),
                web_platform_type: text(web, "WEB_PLATFORM_TYPE"),
            },
            email_channel: EmailChannel {
                email_available_services: text(email, "EMAIL_AVAILABLE_SERVICES"),
                email_address: text(email, "EMAIL_ADDRESS"),
                email_attention_hours: text(email, "EMAIL_ATTENTION_HOURS"),
            },
            social_media_channel: SocialMediaChannel {
                social_media_available_services: text(social, "SOCIAL_MEDIA_AVAILABLE_SERVICES"),
                social_media_account: text(social, "SOCIAL_MEDIA_ACCOUNT"),
                social_media_attention_hours: text(social, "SOCIAL_MEDIA_ATTENTION_HOURS"),
            },
        })
    }
}

/// Builds [`PhoneChannels`] from `payload.BOPERS_PHONE_CHANNEL` and
/// `payload.BOPERS_SMS_CHANNEL`. Service lists arrive comma separated.
#[derive(Debug, Clone, Copy, Default)]
pub struct PhoneChannelsTransform;

impl RecordTransform for PhoneChannelsTransform {
    type Output = PhoneChannels;

    fn transform(&self, record: &RawRecord) -> Result<PhoneChannels, TransformError> {
        let payload = payload(record)?;
        let phone = section(payload, "BOPERS_PHONE_CHANNEL");
        let sms = section(payload, "BOPERS_SMS_CHANNEL");

        Ok(PhoneChannels {
            phone_channel: PhoneChannel {
                phone_available_services: list(phone, "PHONE_AVAILABLE_SERVICES"),
                phone_number: text(phone, "PHONE_NUMBER"),
                phone_attention_hours: text(phone, "PHONE_ATTENTION_HOURS"),
            },
            sms_channel: SmsChannel {
                sms_available_services: list(sms, "SMS_AVAILABLE_SERVICES"),
                sms_available_services_code: list(sms, "SMS_AVAILABLE_SERVICES_CODE"),
                sms_attention_hours: text(sms, "SMS_ATTENTION_HOURS"),
            },
        })
    }
}

/// Builds [`Customer`] from the flat `payload` of a customer record.
///
/// `NAME` splits on whitespace into first, middle and last name; `ID` is the
/// legal representative identification; `CREATED_AT` (RFC 3339) is the
/// customer start date and is dropped when it does not parse.
#[derive(Debug, Clone, Copy, Default)]
pub struct CustomerDataTransform;

impl RecordTransform for CustomerDataTransform {
    type Output = Customer;

    fn transform(&self, record: &RawRecord) -> Result<Customer, TransformError> {
        let payload = payload(record)?;
        let fields = Some(payload);

        let mut identification = PersonalCustomerIdentification::default();
        let name = text(fields, "NAME");
        let words: Vec<&str> = name.split_whitespace().collect();
        if let Some((first, rest)) = words.split_first() {
            identification.customer_first_name = (*first).to_owned();
            if let Some((last, middle)) = rest.split_last() {
                identification.customer_last_name = (*last).to_owned();
                identification.customer_middle_name = middle.join(" ");
            }
        }
        identification.customer_init_date = text(fields, "CREATED_AT")
            .parse::<Timestamp>()
            .unwrap_or_default();

        Ok(Customer {
            personal_identification: identification,
            personal_additional_info: PersonalCustomerAdditionalInfo {
                legal_representative_identification: text(fields, "ID"),
                ..PersonalCustomerAdditionalInfo::default()
            },
            ..Customer::default()
        })
    }
}

fn payload(record: &RawRecord) -> Result<&Map<String, Value>, TransformError> {
    record
        .get("payload")
        .and_then(Value::as_object)
        .ok_or(TransformError::InvalidPayload)
}

fn section<'a>(payload: &'a Map<String, Value>, key: &str) -> Option<&'a Map<String, Value>> {
    payload.get(key).and_then(Value::as_object)
}

/// String field of an optional section; anything else reads as empty.
fn text(section: Option<&Map<String, Value>>, key: &str) -> String {
    section
        .and_then(|s| s.get(key))
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_owned()
}

/// Comma separated string field, split verbatim; absent reads as empty.
fn list(section: Option<&Map<String, Value>>, key: &str) -> Vec<String> {
    section
        .and_then(|s| s.get(key))
        .and_then(Value::as_str)
        .map(|v| v.split(',').map(str::to_owned).collect())
        .unwrap_or_default()
}
