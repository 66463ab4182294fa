use std::fmt;

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};

use super::dates;
use crate::codec::RecordFields;

/// Affiliate classes recognized by the movement.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrgType {
    UserGroup,
    Chapter,
    ThematicOrganization,
    AlliedOrOther,
}

impl OrgType {
    pub const fn label(self) -> &'static str {
        match self {
            OrgType::UserGroup => "User Group",
            OrgType::Chapter => "Chapter",
            OrgType::ThematicOrganization => "Thematic Organization",
            OrgType::AlliedOrOther => "Allied or other organization",
        }
    }

    pub fn from_label(raw: &str) -> Option<Self> {
        match raw.trim() {
            "User Group" => Some(OrgType::UserGroup),
            "Chapter" => Some(OrgType::Chapter),
            "Thematic Organization" => Some(OrgType::ThematicOrganization),
            "Allied or other organization" => Some(OrgType::AlliedOrOther),
            _ => None,
        }
    }

    /// Chapters and thematic organizations share reporting obligations,
    /// including the financial-report requirement.
    pub const fn chapter_like(self) -> bool {
        matches!(self, OrgType::Chapter | OrgType::ThematicOrganization)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecognitionStatus {
    Recognised,
    Derecognised,
    Suspended,
}

impl RecognitionStatus {
    pub const fn label(self) -> &'static str {
        match self {
            RecognitionStatus::Recognised => "recognised",
            RecognitionStatus::Derecognised => "derecognised",
            RecognitionStatus::Suspended => "suspended",
        }
    }

    pub fn from_label(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "recognised" => Some(RecognitionStatus::Recognised),
            "derecognised" => Some(RecognitionStatus::Derecognised),
            "suspended" => Some(RecognitionStatus::Suspended),
            _ => None,
        }
    }
}

/// Reporting marker kept on the organization record. The `-N` variants
/// flag affiliates that have never filed a report before.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportingStatus {
    Tick,
    TickNew,
    Cross,
    CrossNew,
}

impl ReportingStatus {
    pub const fn label(self) -> &'static str {
        match self {
            ReportingStatus::Tick => "Tick",
            ReportingStatus::TickNew => "Tick-N",
            ReportingStatus::Cross => "Cross",
            ReportingStatus::CrossNew => "Cross-N",
        }
    }

    pub fn from_label(raw: &str) -> Option<Self> {
        match raw.trim() {
            "Tick" => Some(ReportingStatus::Tick),
            "Tick-N" => Some(ReportingStatus::TickNew),
            "Cross" => Some(ReportingStatus::Cross),
            "Cross-N" => Some(ReportingStatus::CrossNew),
            _ => None,
        }
    }
}

/// Out-of-compliance level, 0 (fully compliant) through 5 (escalated
/// for manual review).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct OocLevel(u8);

impl OocLevel {
    pub const COMPLIANT: Self = Self(0);
    pub const DUE_SOON: Self = Self(1);
    pub const INITIAL_REVIEW: Self = Self(2);
    pub const FIRST_REMINDER: Self = Self(3);
    pub const SECOND_REMINDER: Self = Self(4);
    pub const ESCALATED: Self = Self(5);

    pub const fn new(level: u8) -> Option<Self> {
        if level <= 5 {
            Some(Self(level))
        } else {
            None
        }
    }

    pub fn from_label(raw: &str) -> Option<Self> {
        raw.trim().parse::<u8>().ok().and_then(Self::new)
    }

    pub const fn numeric(self) -> u8 {
        self.0
    }
}

impl fmt::Display for OocLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One affiliate row from the organizational-information document.
///
/// The raw field map stays authoritative: the typed view is parsed once
/// at construction, mutators keep both in step, and fields the sweep
/// never reads are rewritten untouched. Values that fail to parse read
/// as absent, which keeps the record out of every ladder rule without
/// failing the sweep.
#[derive(Debug, Clone, PartialEq)]
pub struct OrganizationRecord {
    fields: RecordFields,
    group_name: String,
    org_type: Option<OrgType>,
    legal_entity: bool,
    recognition: Option<RecognitionStatus>,
    agreement_date: Option<NaiveDate>,
    reporting_due_date: Option<NaiveDate>,
    uptodate_reporting: Option<ReportingStatus>,
    out_of_compliance_level: Option<OocLevel>,
    bypass_autochecks: bool,
    declares_fiscal_year: bool,
}

impl OrganizationRecord {
    pub fn from_fields(fields: RecordFields) -> Self {
        let group_name = fields
            .get("group_name")
            .map(|raw| raw.trim().to_string())
            .unwrap_or_default();
        let org_type = fields.get("org_type").and_then(|raw| OrgType::from_label(raw));
        let legal_entity = flag_is_yes(fields.get("legal_entity"));
        let recognition = fields
            .get("recognition_status")
            .and_then(|raw| RecognitionStatus::from_label(raw));
        let agreement_date = fields
            .get("agreement_date")
            .and_then(|raw| dates::parse_date(raw));
        let reporting_due_date = fields
            .get("reporting_due_date")
            .and_then(|raw| dates::parse_date(raw));
        let uptodate_reporting = fields
            .get("uptodate_reporting")
            .and_then(|raw| ReportingStatus::from_label(raw));
        let out_of_compliance_level = fields
            .get("out_of_compliance_level")
            .and_then(|raw| OocLevel::from_label(raw));
        let bypass_autochecks = flag_is_yes(fields.get("me_bypass_ooc_autochecks"));
        // Declaring either end of a fiscal year moves the affiliate off
        // the calendar-year reporting cadence.
        let declares_fiscal_year = has_content(fields.get("fiscal_year_start"))
            || has_content(fields.get("fiscal_year_end"));

        Self {
            fields,
            group_name,
            org_type,
            legal_entity,
            recognition,
            agreement_date,
            reporting_due_date,
            uptodate_reporting,
            out_of_compliance_level,
            bypass_autochecks,
            declares_fiscal_year,
        }
    }

    pub fn group_name(&self) -> &str {
        &self.group_name
    }

    pub fn org_type(&self) -> Option<OrgType> {
        self.org_type
    }

    pub fn is_legal_entity(&self) -> bool {
        self.legal_entity
    }

    pub fn recognition(&self) -> Option<RecognitionStatus> {
        self.recognition
    }

    pub fn agreement_date(&self) -> Option<NaiveDate> {
        self.agreement_date
    }

    pub fn reporting_due_date(&self) -> Option<NaiveDate> {
        self.reporting_due_date
    }

    pub fn uptodate_reporting(&self) -> Option<ReportingStatus> {
        self.uptodate_reporting
    }

    pub fn ooc_level(&self) -> Option<OocLevel> {
        self.out_of_compliance_level
    }

    pub fn bypass_engaged(&self) -> bool {
        self.bypass_autochecks
    }

    pub fn declares_fiscal_year(&self) -> bool {
        self.declares_fiscal_year
    }

    /// Contacts greeted in talk-page notices, in column order.
    pub fn group_contacts(&self) -> Vec<String> {
        ["group_contact1", "group_contact2"]
            .iter()
            .filter_map(|key| self.fields.get(*key))
            .map(|raw| raw.trim())
            .filter(|raw| !raw.is_empty())
            .map(str::to_string)
            .collect()
    }

    pub fn fields(&self) -> &RecordFields {
        &self.fields
    }

    pub fn into_fields(self) -> RecordFields {
        self.fields
    }

    pub fn set_ooc_level(&mut self, level: OocLevel) {
        self.fields
            .insert("out_of_compliance_level".to_string(), level.to_string());
        self.out_of_compliance_level = Some(level);
    }

    pub fn set_reporting_status(&mut self, status: ReportingStatus) {
        self.fields
            .insert("uptodate_reporting".to_string(), status.label().to_string());
        self.uptodate_reporting = Some(status);
    }

    pub fn set_reporting_due_date(&mut self, due: NaiveDate) {
        self.fields
            .insert("reporting_due_date".to_string(), dates::format_date(due));
        self.reporting_due_date = Some(due);
    }

    pub fn engage_bypass(&mut self) {
        self.fields
            .insert("me_bypass_ooc_autochecks".to_string(), "Yes".to_string());
        self.bypass_autochecks = true;
    }

    pub fn set_reporting_note(&mut self, note: &str) {
        self.fields
            .insert("notes_on_reporting".to_string(), note.to_string());
    }
}

fn flag_is_yes(raw: Option<&String>) -> bool {
    raw.map(|value| value.trim()).is_some_and(|value| value.eq_ignore_ascii_case("yes"))
}

fn has_content(raw: Option<&String>) -> bool {
    raw.is_some_and(|value| !value.trim().is_empty())
}

/// Year standing in for "never filed" wherever a report is required but
/// absent. Any real report postdates it.
pub const NEVER_FILED_YEAR: i32 = 2000;

/// A filed activity or financial report. The year of `end_date` is the
/// report year the ladder reasons about.
#[derive(Debug, Clone, PartialEq)]
pub struct Report {
    pub group_name: String,
    pub end_date: NaiveDate,
    pub submitted: NaiveDateTime,
}

impl Report {
    /// Decodes one report row. Rows without a group are dropped; rows
    /// with unparseable dates degrade to the never-filed placeholder so
    /// bad data reads as "nothing filed" instead of failing the sweep.
    pub fn from_fields(fields: &RecordFields) -> Option<Self> {
        let group_name = fields
            .get("group_name")
            .map(|raw| raw.trim().to_string())
            .filter(|name| !name.is_empty())?;
        let end_date = fields
            .get("end_date")
            .and_then(|raw| dates::parse_date(raw))
            .unwrap_or_else(placeholder_date);
        let submitted = fields
            .get("submission_date")
            .and_then(|raw| dates::parse_datetime(raw))
            .unwrap_or_else(placeholder_timestamp);

        Some(Self {
            group_name,
            end_date,
            submitted,
        })
    }

    pub fn placeholder(group_name: &str) -> Self {
        Self {
            group_name: group_name.to_string(),
            end_date: placeholder_date(),
            submitted: placeholder_timestamp(),
        }
    }
}

fn placeholder_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(NEVER_FILED_YEAR, 1, 1).expect("fixed calendar date")
}

fn placeholder_timestamp() -> NaiveDateTime {
    placeholder_date().and_time(NaiveTime::MIN)
}

/// Row appended to the compliance log whenever a level is assigned.
#[derive(Debug, Clone, PartialEq)]
pub struct ComplianceLogEntry {
    pub group_name: String,
    pub level: OocLevel,
    pub financial_year: i32,
    pub created_at: NaiveDateTime,
}

impl ComplianceLogEntry {
    pub fn to_fields(&self) -> RecordFields {
        let mut fields = RecordFields::new();
        fields.insert("group_name".to_string(), self.group_name.clone());
        fields.insert("level".to_string(), self.level.to_string());
        fields.insert("financial_year".to_string(), self.financial_year.to_string());
        fields.insert(
            "created_at".to_string(),
            dates::format_datetime(self.created_at),
        );
        fields
    }
}
