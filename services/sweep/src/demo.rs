use crate::infra::{InMemoryDocumentStore, InMemoryNotificationChannel};
use crate::sweep::{render_summary, sweep_instant};
use chrono::{Datelike, Duration, NaiveDate};
use clap::Args;
use std::path::PathBuf;
use std::sync::Arc;
use wadp_compliance::codec::RecordFields;
use wadp_compliance::config::SweepSettings;
use wadp_compliance::error::AppError;
use wadp_compliance::workflows::compliance::{
    ComplianceSweepService, PortalDocument, SweepConfig,
};

#[derive(Args, Debug, Default)]
pub(crate) struct DemoArgs {
    /// Sweep date for the demo (YYYY-MM-DD). Defaults to today.
    #[arg(long, value_parser = crate::infra::parse_date)]
    pub(crate) as_of: Option<NaiveDate>,
}

/// Seeds an in-memory portal with affiliates staged at several ladder
/// rungs, runs one real sweep over it, and prints everything the sweep
/// decided and would have sent.
pub(crate) fn run_demo(args: DemoArgs) -> Result<(), AppError> {
    let DemoArgs { as_of } = args;
    let now = sweep_instant(as_of);
    let today = now.date();

    println!("Affiliates compliance sweep demo");
    println!("Sweeping a seeded in-memory portal as of {today}");

    let store = Arc::new(InMemoryDocumentStore::default());
    seed_portal(&store, today);
    let channel = Arc::new(InMemoryNotificationChannel::default());
    let settings = SweepSettings {
        data_dir: PathBuf::from("./demo-portal"),
        compliance_staff: "Compliance-Team".to_string(),
        monitoring_copy: "Compliance-Monitoring".to_string(),
    };
    let service = ComplianceSweepService::new(
        store,
        channel.clone(),
        SweepConfig::default(),
        settings,
    );

    let summary = service.run(now)?;
    println!();
    render_summary(&summary);

    let posts = channel.talk_posts();
    if posts.is_empty() {
        println!("\nTalk-page notices: none");
    } else {
        println!("\nTalk-page notices ({}):", posts.len());
        for (target, text) in &posts {
            let heading = text.lines().next().unwrap_or_default();
            println!("- {target}: {heading}");
        }
    }

    let emails = channel.emails();
    if emails.is_empty() {
        println!("\nStaff emails: none");
    } else {
        println!("\nStaff emails ({}):", emails.len());
        for (subject, recipient) in &emails {
            println!("- {subject} -> {recipient}");
        }
    }

    match serde_json::to_string_pretty(&summary) {
        Ok(json) => println!("\nSummary payload:\n{json}"),
        Err(err) => println!("\nSummary payload unavailable: {err}"),
    }

    Ok(())
}

/// One affiliate at each interesting rung, with due dates placed
/// relative to the sweep date so every rule has something to do no
/// matter when the demo runs.
fn seed_portal(store: &InMemoryDocumentStore, today: NaiveDate) {
    let year = today.year();
    let agreement = format!("{}-06-01", year - 10);

    let mut bypassed = organization(
        "Harbor Lights Collective",
        "Chapter",
        5,
        "Cross",
        today - Duration::days(400),
        &agreement,
        None,
    );
    bypassed.insert("me_bypass_ooc_autochecks".to_string(), "Yes".to_string());

    let organizations = vec![
        organization(
            "Sandbox Puzzles User Group",
            "User Group",
            0,
            "Tick",
            today + Duration::days(17),
            &agreement,
            Some(("Amara", "Bing")),
        ),
        organization(
            "Chronicle Keepers User Group",
            "User Group",
            2,
            "Cross",
            today - Duration::days(20),
            &agreement,
            None,
        ),
        organization(
            "Woodblock Printers User Group",
            "User Group",
            2,
            "Cross",
            today - Duration::days(45),
            &agreement,
            None,
        ),
        organization(
            "Cartography Collective",
            "Chapter",
            3,
            "Cross",
            today - Duration::days(75),
            &agreement,
            None,
        ),
        organization(
            "Glassblowers Guild User Group",
            "User Group",
            4,
            "Cross",
            today - Duration::days(100),
            &agreement,
            None,
        ),
        organization(
            "Atlas Makers",
            "Chapter",
            2,
            "Cross",
            today - Duration::days(40),
            &agreement,
            None,
        ),
        bypassed,
        organization(
            "Meridian Mappers",
            "Chapter",
            0,
            "Tick",
            today + Duration::days(200),
            &agreement,
            None,
        ),
    ];

    let activity_reports = vec![
        report("Sandbox Puzzles User Group", year - 1),
        current_report("Chronicle Keepers User Group", today),
        report("Woodblock Printers User Group", year - 1),
        report("Cartography Collective", year - 1),
        report("Glassblowers Guild User Group", year - 1),
        report("Atlas Makers", year - 1),
        report("Harbor Lights Collective", year - 3),
        report("Meridian Mappers", year - 1),
    ];
    let financial_reports = vec![
        report("Cartography Collective", year - 1),
        report("Meridian Mappers", year - 1),
    ];

    store.seed(PortalDocument::Organizations, organizations);
    store.seed(PortalDocument::ActivityReports, activity_reports);
    store.seed(PortalDocument::FinancialReports, financial_reports);
    store.seed(PortalDocument::ComplianceLog, Vec::new());
}

fn organization(
    name: &str,
    org_type: &str,
    level: u8,
    marker: &str,
    due: NaiveDate,
    agreement: &str,
    contacts: Option<(&str, &str)>,
) -> RecordFields {
    let mut fields = RecordFields::new();
    fields.insert("group_name".to_string(), name.to_string());
    fields.insert("org_type".to_string(), org_type.to_string());
    fields.insert("recognition_status".to_string(), "recognised".to_string());
    fields.insert(
        "legal_entity".to_string(),
        if org_type == "User Group" { "No" } else { "Yes" }.to_string(),
    );
    fields.insert("me_bypass_ooc_autochecks".to_string(), "No".to_string());
    fields.insert("out_of_compliance_level".to_string(), level.to_string());
    fields.insert("uptodate_reporting".to_string(), marker.to_string());
    fields.insert("agreement_date".to_string(), agreement.to_string());
    fields.insert(
        "reporting_due_date".to_string(),
        due.format("%Y-%m-%d").to_string(),
    );
    if let Some((first, second)) = contacts {
        fields.insert("group_contact1".to_string(), first.to_string());
        fields.insert("group_contact2".to_string(), second.to_string());
    }
    fields
}

fn report(name: &str, end_year: i32) -> RecordFields {
    let mut fields = RecordFields::new();
    fields.insert("group_name".to_string(), name.to_string());
    fields.insert("end_date".to_string(), format!("{end_year}-12-31"));
    fields.insert(
        "submission_date".to_string(),
        format!("{}-01-15 09:30:00", end_year + 1),
    );
    fields
}

/// A report filed on the sweep day itself, so its filing year matches
/// the current year whatever date the demo runs on.
fn current_report(name: &str, today: NaiveDate) -> RecordFields {
    let mut fields = RecordFields::new();
    fields.insert("group_name".to_string(), name.to_string());
    fields.insert(
        "end_date".to_string(),
        today.format("%Y-%m-%d").to_string(),
    );
    fields.insert(
        "submission_date".to_string(),
        format!("{} 08:45:00", today.format("%Y-%m-%d")),
    );
    fields
}
