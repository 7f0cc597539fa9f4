//! Channel catalogue models.
//!
//! Wire names follow the published contracts: the ATM CRUD resource keeps the
//! flat lowercase column names, the read models use camelCase.

use channels_json::Timestamp;
use serde::{Deserialize, Serialize};

/// ATM record managed through the CRUD endpoints.
///
/// Missing fields deserialize to their empty value, which the canonical
/// encoder then omits from responses.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Atm {
    pub id: i64,
    #[serde(rename = "atmidentifier")]
    pub atm_identifier: String,
    #[serde(rename = "atmaddress_streetname")]
    pub street_name: String,
    #[serde(rename = "atmaddress_buildingnumber")]
    pub building_number: String,
    #[serde(rename = "atmtownname")]
    pub town_name: String,
    #[serde(rename = "atmdistrictname")]
    pub district_name: String,
    #[serde(rename = "atmcountrysubdivisionmajorname")]
    pub country_subdivision_major_name: String,
    #[serde(rename = "atmfromdatetime")]
    pub from_datetime: Timestamp,
    #[serde(rename = "atmtodatetime")]
    pub to_datetime: Timestamp,
    #[serde(rename = "atmtimetype")]
    pub time_type: String,
    #[serde(rename = "atmattentionhour")]
    pub attention_hour: String,
    #[serde(rename = "atmservicetype")]
    pub service_type: String,
    #[serde(rename = "atmaccesstype")]
    pub access_type: String,
}

/// ATM read model, keyed by `atm_identifier`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AutomatedTellerMachine {
    #[serde(rename = "atmIdentifier")]
    pub atm_identifier: String,
    #[serde(rename = "streetName")]
    pub street_name: String,
    #[serde(rename = "buildingNumber")]
    pub building_number: String,
    #[serde(rename = "atmTownName")]
    pub town_name: String,
    #[serde(rename = "atmDistrictName")]
    pub district_name: String,
    #[serde(rename = "atmCountrySubDivisionMajorName")]
    pub country_subdivision_major_name: String,
    #[serde(rename = "atmFromDatetime")]
    pub from_datetime: String,
    #[serde(rename = "atmToDatetime")]
    pub to_datetime: String,
    #[serde(rename = "atmTimeType")]
    pub time_type: String,
    #[serde(rename = "atmAttentionHour")]
    pub attention_hour: String,
    #[serde(rename = "atmServiceType")]
    pub service_type: String,
    #[serde(rename = "atmAccessType")]
    pub access_type: String,
}

/// Branch or other in-person channel, keyed by `channel_identifier`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PresentialChannel {
    #[serde(rename = "presentialChannelIdentifier")]
    pub channel_identifier: String,
    #[serde(rename = "presentialChannelType")]
    pub channel_type: String,
    #[serde(rename = "streetName")]
    pub street_name: String,
    #[serde(rename = "buildingNumber")]
    pub building_number: String,
    #[serde(rename = "presentialTownName")]
    pub town_name: String,
    #[serde(rename = "presentialDistrictName")]
    pub district_name: String,
    #[serde(rename = "presentialCountrySubDivisionMajorName")]
    pub country_subdivision_major_name: String,
    #[serde(rename = "presentialFromDatetime")]
    pub from_datetime: String,
    #[serde(rename = "presentialToDatetime")]
    pub to_datetime: String,
    #[serde(rename = "presentialTimeType")]
    pub time_type: String,
    #[serde(rename = "presentialAttentionHours")]
    pub attention_hours: String,
    #[serde(rename = "presentialAvailableServices")]
    pub available_services: String,
    #[serde(rename = "presentialWeekDayCode")]
    pub week_day_code: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct WebChannel {
    pub web_channel_type: String,
    #[serde(rename = "webURLAddress")]
    pub web_url_address: String,
    pub web_available_services: String,
    pub web_attention_hours: String,
    pub web_platform_type: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct EmailChannel {
    pub email_available_services: String,
    pub email_address: String,
    pub email_attention_hours: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SocialMediaChannel {
    pub social_media_available_services: String,
    pub social_media_account: String,
    pub social_media_attention_hours: String,
}

/// Electronic channels of one customer record, as published downstream.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ElectronicChannels {
    pub web_channel: WebChannel,
    pub email_channel: EmailChannel,
    pub social_media_channel: SocialMediaChannel,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PhoneChannel {
    pub phone_available_services: Vec<String>,
    pub phone_number: String,
    pub phone_attention_hours: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SmsChannel {
    pub sms_available_services: Vec<String>,
    pub sms_available_services_code: Vec<String>,
    pub sms_attention_hours: String,
}

/// Phone and SMS channels of one customer record, as published downstream.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PhoneChannels {
    pub phone_channel: PhoneChannel,
    pub sms_channel: SmsChannel,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PersonalCustomerIdentification {
    pub customer_identification: String,
    pub customer_first_name: String,
    pub customer_middle_name: String,
    pub customer_last_name: String,
    pub customer_second_last_name: String,
    pub customer_init_date: Timestamp,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PersonalCustomerAdditionalInfo {
    pub customer_street_name: String,
    pub customer_building_number: String,
    pub customer_district_name: String,
    pub customer_country_sub_division_major_name: String,
    pub customer_email_address: String,
    pub customer_phone_number: String,
    pub legal_representative_first_name: String,
    pub legal_representative_middle_name: String,
    pub legal_representative_last_name: String,
    pub legal_representative_second_last_name: String,
    pub legal_representative_identification: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct LegalEntityIdentification {
    pub legal_entity_first_name: String,
    pub legal_entity_middle_name: String,
    pub legal_entity_last_name: String,
    pub legal_entity_second_last_name: String,
    /// Wire name keeps the contract's spelling.
    #[serde(rename = "legalEntityPropietaryIdentification")]
    pub legal_entity_proprietary_identification: String,
    pub legal_entity_business_type: String,
    pub legal_entity_init_date: Timestamp,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct LegalEntityAdditionalInfo {
    pub legal_entity_street_name: String,
    pub legal_entity_building_number: String,
    pub legal_entity_district_name: String,
    pub legal_entity_country_sub_division_major_name: String,
    pub legal_entity_website: String,
    pub legal_entity_email_address: String,
    pub legal_entity_phone_number: String,
    pub legal_entity_representative_first_name: String,
    pub legal_entity_representative_middle_name: String,
    pub legal_entity_representative_last_name: String,
    pub legal_entity_representative_second_last_name: String,
    pub legal_entity_representative_identification: String,
}

/// Customer master data, as published downstream.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Customer {
    pub personal_identification: PersonalCustomerIdentification,
    pub personal_additional_info: PersonalCustomerAdditionalInfo,
    pub legal_entity_identification: LegalEntityIdentification,
    pub legal_entity_additional_info: LegalEntityAdditionalInfo,
}
