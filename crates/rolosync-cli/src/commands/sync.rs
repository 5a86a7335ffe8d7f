use crate::commands::{print_json, Context};
use crate::error::invalid_input;
use anyhow::{Context as _, Result};
use clap::Args;
use rolosync_config as config;
use rolosync_core::{build_plan, Person, RunReport, SyncPlan};
use rolosync_google::auth::{Authenticator, ClientSecrets};
use rolosync_google::people::PeopleClient;
use rolosync_google::sheets::SheetsClient;
use rolosync_google::ContactDirectory;
use std::thread;
use std::time::Duration;
use tracing::{debug, warn};

#[derive(Debug, Args)]
pub struct SyncArgs {
    /// Compute and report changes without writing to the address book
    #[arg(long)]
    pub dry_run: bool,
    /// Spreadsheet id, overriding the configured source
    #[arg(long)]
    pub spreadsheet_id: Option<String>,
    /// Worksheet title, overriding the configured one
    #[arg(long)]
    pub worksheet: Option<String>,
}

pub fn sync(ctx: &Context<'_>, args: SyncArgs) -> Result<()> {
    let spreadsheet_id = match args.spreadsheet_id {
        Some(id) => {
            let id = id.trim().to_string();
            if id.is_empty() {
                return Err(invalid_input("--spreadsheet-id must not be empty"));
            }
            id
        }
        None => ctx
            .config
            .spreadsheet
            .resolve_id()
            .with_context(|| "resolve spreadsheet id")?,
    };
    let worksheet = args
        .worksheet
        .unwrap_or_else(|| ctx.config.spreadsheet.worksheet.clone());

    let secrets = ClientSecrets::from_file(&ctx.config.credentials_path).with_context(|| {
        format!(
            "read credentials {}",
            ctx.config.credentials_path.display()
        )
    })?;
    let token_path = config::resolve_token_path(ctx.config.token_path.clone())
        .with_context(|| "resolve token path")?;
    let auth = Authenticator::new(secrets, token_path)?;
    let token = auth.ensure_token().with_context(|| "acquire access token")?;

    let sheets = SheetsClient::new(token.access_token.clone())?;
    let rows = sheets
        .fetch_rows(&spreadsheet_id, &worksheet)
        .with_context(|| format!("read worksheet {worksheet} of spreadsheet {spreadsheet_id}"))?;
    let (records, rows_skipped) = parse_rows(&rows);
    debug!(records = records.len(), rows_skipped, "sheet records loaded");

    let people = PeopleClient::new(token.access_token, ctx.config.page_size)?;
    people.warm_up().with_context(|| "warm up contact service")?;
    if ctx.config.warmup_delay_ms > 0 {
        thread::sleep(Duration::from_millis(ctx.config.warmup_delay_ms));
    }
    let contacts = people
        .list_contacts()
        .with_context(|| "list remote contacts")?;
    debug!(contacts = contacts.len(), "remote contacts listed");

    let plan = build_plan(&records, &contacts);
    let mut report = apply_plan(&people, &plan, args.dry_run);
    report.rows_skipped = rows_skipped;

    if ctx.json {
        return print_json(&report);
    }
    print_report(&report);
    Ok(())
}

/// Row 1 is the header; data rows with too few columns are dropped.
fn parse_rows(rows: &[Vec<String>]) -> (Vec<Person>, usize) {
    let mut records = Vec::new();
    let mut skipped = 0;
    for row in rows.iter().skip(1) {
        match Person::from_row(row) {
            Some(person) => records.push(person),
            None => skipped += 1,
        }
    }
    (records, skipped)
}

/// Walks the plan against the directory. Every write failure is isolated to
/// its contact: logged, counted, and the sweep continues.
fn apply_plan<D: ContactDirectory>(directory: &D, plan: &SyncPlan, dry_run: bool) -> RunReport {
    let mut report = RunReport::new(dry_run);
    report.matched = plan.matched;
    report.unmatched = plan.unmatched;
    report.unchanged = plan.unchanged;
    report.skipped = plan.skipped.len();

    for skipped in &plan.skipped {
        warn!(
            resource = %skipped.resource_name,
            name = %skipped.display_name,
            "contact has no etag; update skipped"
        );
    }

    for update in &plan.updates {
        if dry_run {
            report.updated += 1;
            continue;
        }
        match directory.update_contact(update) {
            Ok(()) => report.updated += 1,
            Err(err) => {
                warn!(resource = %update.resource_name, error = %err, "update failed");
                report.record_failure(format!("update {}: {err}", update.resource_name));
            }
        }
    }

    for create in &plan.creates {
        if dry_run {
            report.created += 1;
            continue;
        }
        let label = create
            .email
            .as_deref()
            .or(create.display_name.as_deref())
            .unwrap_or("record");
        match directory.create_contact(create) {
            Ok(()) => report.created += 1,
            Err(err) => {
                warn!(contact = %label, error = %err, "create failed");
                report.record_failure(format!("create {label}: {err}"));
            }
        }
    }

    report
}

fn print_report(report: &RunReport) {
    if report.dry_run {
        println!("Dry run; no changes were written.");
    }
    println!(
        "Reconciled {} sheet records: updated {}, created {}, unchanged {}, skipped {}",
        report.matched + report.unmatched,
        report.updated,
        report.created,
        report.unchanged,
        report.skipped
    );
    if report.rows_skipped > 0 {
        println!("Skipped {} malformed sheet rows.", report.rows_skipped);
    }
    if !report.failures.is_empty() {
        println!("Failures:");
        for failure in &report.failures {
            println!("- {failure}");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{apply_plan, parse_rows};
    use rolosync_core::{build_plan, ContactCreate, ContactUpdate, Person, RemoteContact};
    use rolosync_google::{ContactDirectory, GoogleError};
    use std::cell::RefCell;

    #[derive(Default)]
    struct FakeDirectory {
        fail_updates: bool,
        updates: RefCell<Vec<ContactUpdate>>,
        creates: RefCell<Vec<ContactCreate>>,
    }

    impl ContactDirectory for FakeDirectory {
        fn warm_up(&self) -> rolosync_google::Result<()> {
            Ok(())
        }

        fn list_contacts(&self) -> rolosync_google::Result<Vec<RemoteContact>> {
            Ok(Vec::new())
        }

        fn update_contact(&self, update: &ContactUpdate) -> rolosync_google::Result<()> {
            if self.fail_updates {
                return Err(GoogleError::Io(std::io::Error::other("connection reset")));
            }
            self.updates.borrow_mut().push(update.clone());
            Ok(())
        }

        fn create_contact(&self, create: &ContactCreate) -> rolosync_google::Result<()> {
            self.creates.borrow_mut().push(create.clone());
            Ok(())
        }
    }

    fn person(name: &str, email: &str, phone: &str) -> Person {
        Person {
            name: name.to_string(),
            email: email.to_string(),
            phone_number: phone.to_string(),
        }
    }

    fn contact(email: &str, name: &str, phone: &str, etag: Option<&str>) -> RemoteContact {
        RemoteContact {
            resource_name: "people/1".to_string(),
            etag: etag.map(|etag| etag.to_string()),
            display_name: name.to_string(),
            emails: vec![email.to_string()],
            phones: if phone.is_empty() {
                Vec::new()
            } else {
                vec![phone.to_string()]
            },
        }
    }

    #[test]
    fn parse_rows_skips_header_and_short_rows() {
        let rows = vec![
            vec!["id".into(), "name".into(), "role".into(), "email".into(), "phone".into()],
            vec![
                "1".into(),
                "Amy Lee".into(),
                "analyst".into(),
                "amy@udel.edu".into(),
                "302-555-0123".into(),
            ],
            vec!["2".into(), "Short Row".into()],
        ];
        let (records, skipped) = parse_rows(&rows);
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].name, "Amy Lee");
        assert_eq!(skipped, 1);
    }

    #[test]
    fn drifted_name_issues_one_update_carrying_names_only() {
        let records = vec![person("Amy Lee", "amy@udel.edu", "302-555-0123")];
        let contacts = vec![contact("amy@udel.edu", "Amy L", "(302) 555-0123", Some("E1"))];
        let plan = build_plan(&records, &contacts);
        let directory = FakeDirectory::default();

        let report = apply_plan(&directory, &plan, false);

        let updates = directory.updates.borrow();
        assert_eq!(updates.len(), 1);
        assert_eq!(updates[0].etag, "E1");
        assert_eq!(updates[0].fields.display_name.as_deref(), Some("Amy Lee"));
        assert!(updates[0].fields.phone.is_none());
        assert!(directory.creates.borrow().is_empty());
        assert_eq!(report.updated, 1);
        assert_eq!(report.failed, 0);
    }

    #[test]
    fn clean_match_issues_no_calls() {
        let records = vec![person("Amy Lee", "amy@udel.edu", "302-555-0123")];
        let contacts = vec![contact("amy@udel.edu", "amy lee", "+1 302 555 0123", Some("E1"))];
        let plan = build_plan(&records, &contacts);
        let directory = FakeDirectory::default();

        let report = apply_plan(&directory, &plan, false);

        assert!(directory.updates.borrow().is_empty());
        assert!(directory.creates.borrow().is_empty());
        assert_eq!(report.unchanged, 1);
    }

    #[test]
    fn update_failures_do_not_stop_creates() {
        let records = vec![
            person("Amy Lee", "amy@udel.edu", "302-555-0124"),
            person("Bo Diaz", "bo@example.com", "302-555-0188"),
        ];
        let contacts = vec![contact("amy@udel.edu", "Amy L", "(302) 555-0123", Some("E1"))];
        let plan = build_plan(&records, &contacts);
        let directory = FakeDirectory {
            fail_updates: true,
            ..FakeDirectory::default()
        };

        let report = apply_plan(&directory, &plan, false);

        assert_eq!(report.failed, 1);
        assert_eq!(report.failures.len(), 1);
        assert!(report.failures[0].contains("people/1"));
        assert_eq!(report.created, 1);
        assert_eq!(directory.creates.borrow().len(), 1);
    }

    #[test]
    fn missing_etag_skips_without_a_write() {
        let records = vec![person("Amy Lee", "amy@udel.edu", "302-555-0124")];
        let contacts = vec![contact("amy@udel.edu", "Amy L", "(302) 555-0123", None)];
        let plan = build_plan(&records, &contacts);
        let directory = FakeDirectory::default();

        let report = apply_plan(&directory, &plan, false);

        assert!(directory.updates.borrow().is_empty());
        assert_eq!(report.skipped, 1);
        assert_eq!(report.failed, 0);
    }

    #[test]
    fn dry_run_counts_without_calling_the_directory() {
        let records = vec![
            person("Amy Lee", "amy@udel.edu", "302-555-0124"),
            person("Bo Diaz", "bo@example.com", "302-555-0188"),
        ];
        let contacts = vec![contact("amy@udel.edu", "Amy L", "(302) 555-0123", Some("E1"))];
        let plan = build_plan(&records, &contacts);
        let directory = FakeDirectory::default();

        let report = apply_plan(&directory, &plan, true);

        assert!(directory.updates.borrow().is_empty());
        assert!(directory.creates.borrow().is_empty());
        assert!(report.dry_run);
        assert_eq!(report.updated, 1);
        assert_eq!(report.created, 1);
    }
}
