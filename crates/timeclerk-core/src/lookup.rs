//! Activity and member lookups against the Ledger

use std::sync::Arc;

use timeclerk_config::LedgerConfig;
use timeclerk_ledger::{Filter, Ledger, ListQuery, SortDir};
use timeclerk_util::{MemberNumber, Result, TimeclerkError};
use tracing::debug;

use crate::model::{Activity, Member};

const MIN_SEARCH_CHARS: usize = 2;

/// Read access to the activity table
#[derive(Clone)]
pub struct ActivityCatalog {
    ledger: Arc<dyn Ledger>,
    config: LedgerConfig,
}

impl ActivityCatalog {
    pub fn new(ledger: Arc<dyn Ledger>, config: LedgerConfig) -> Self {
        Self { ledger, config }
    }

    /// Fetch one activity by record id. Inactive activities resolve
    /// normally; check-in rejects them.
    pub async fn resolve(&self, id: &timeclerk_util::RecordId) -> Result<Activity> {
        let record = self.ledger.get(&self.config.tables.activities, id).await?;
        Ok(Activity::from_record(&record, &self.config.fields.activities))
    }

    /// All activities currently offered at the kiosk, sorted by name.
    pub async fn list_active(&self) -> Result<Vec<Activity>> {
        let fields = &self.config.fields.activities;
        let query = ListQuery::new()
            .filter(Filter::eq_bool(&fields.active, true))
            .sort(&fields.name, SortDir::Asc);
        let records = self.ledger.list(&self.config.tables.activities, query).await?;
        Ok(records
            .iter()
            .map(|r| Activity::from_record(r, fields))
            .collect())
    }
}

/// Read access to the member table, with membership gating
#[derive(Clone)]
pub struct MemberDirectory {
    ledger: Arc<dyn Ledger>,
    config: LedgerConfig,
    allowed_types: Vec<String>,
    max_search_results: usize,
}

impl MemberDirectory {
    pub fn new(
        ledger: Arc<dyn Ledger>,
        config: LedgerConfig,
        allowed_types: Vec<String>,
        max_search_results: usize,
    ) -> Self {
        Self {
            ledger,
            config,
            allowed_types,
            max_search_results,
        }
    }

    fn type_filter(&self) -> Filter {
        let field = &self.config.fields.members.membership_type;
        Filter::or(
            self.allowed_types
                .iter()
                .map(|t| Filter::eq_str(field, t.clone())),
        )
    }

    /// Resolve a member by number, requiring an allowed membership type.
    ///
    /// A number that matches no member and a number that matches an
    /// ineligible member both return `NotFound`; the kiosk cannot tell
    /// them apart.
    pub async fn resolve_eligible(&self, number: &MemberNumber) -> Result<Member> {
        let fields = &self.config.fields.members;
        let filter = Filter::and([
            Filter::eq_num(&fields.number, number.as_i64()),
            self.type_filter(),
        ]);
        let query = ListQuery::new().filter(filter).max_records(1);
        let records = self.ledger.list(&self.config.tables.members, query).await?;
        match records.first() {
            Some(record) => Ok(Member::from_record(record, fields)),
            None => {
                debug!(member = number.as_str(), "no eligible member for number");
                Err(TimeclerkError::not_found("member not found"))
            }
        }
    }

    /// Resolve a member by number without the eligibility gate.
    ///
    /// Used by the reminder sweep, which works from existing logs: a
    /// member whose membership lapsed mid-shift still gets their
    /// reminder.
    pub async fn resolve_by_number(&self, number: i64) -> Result<Option<Member>> {
        let fields = &self.config.fields.members;
        let query = ListQuery::new()
            .filter(Filter::eq_num(&fields.number, number))
            .max_records(1);
        let records = self.ledger.list(&self.config.tables.members, query).await?;
        Ok(records.first().map(|r| Member::from_record(r, fields)))
    }

    /// Name search over eligible members for the kiosk typeahead.
    ///
    /// Queries shorter than two characters return nothing. Matches
    /// missing a number or name are dropped rather than surfaced
    /// half-usable.
    pub async fn search(&self, query: &str) -> Result<Vec<Member>> {
        let query = query.trim();
        if query.chars().count() < MIN_SEARCH_CHARS {
            return Ok(Vec::new());
        }
        let fields = &self.config.fields.members;
        let filter = Filter::and([
            Filter::Contains {
                field: fields.name.clone(),
                needle: query.to_string(),
            },
            self.type_filter(),
        ]);
        let list = ListQuery::new()
            .filter(filter)
            .max_records(self.max_search_results as u32);
        let records = self.ledger.list(&self.config.tables.members, list).await?;
        Ok(records
            .iter()
            .map(|r| Member::from_record(r, fields))
            .filter(|m| m.number.is_some() && m.name.is_some())
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use timeclerk_config::{Config, RawConfig};
    use timeclerk_ledger::{FieldsBuilder, MockLedger};
    use timeclerk_util::now;

    fn test_config() -> LedgerConfig {
        let raw: RawConfig = toml::from_str(
            r#"
            config_version = 1

            [ledger]
            base_id = "appTEST"

            [ledger.tables]
            members = "Members"
            activities = "Activities"
            logs = "ShiftLogs"

            [notify]
            account_sid = "ACtest"
            from_number = "+15550001111"

            [behavior]
            clock_out_link_base = "https://example.org/clock-out"
            "#,
        )
        .unwrap();
        Config::from_raw(raw).ledger
    }

    fn seed_member(ledger: &MockLedger, num: i64, name: &str, membership: &str) {
        ledger.insert(
            "Members",
            FieldsBuilder::new()
                .num("Member #", num)
                .str("Full Name", name)
                .str("Membership Type", membership)
                .str("Phone Number", "555-123-4567")
                .build(),
        );
    }

    fn directory(ledger: Arc<MockLedger>) -> MemberDirectory {
        MemberDirectory::new(
            ledger,
            test_config(),
            vec!["AM".into(), "LM".into()],
            8,
        )
    }

    #[tokio::test]
    async fn ineligible_member_is_indistinguishable_from_missing() {
        let ledger = Arc::new(MockLedger::new(now()));
        seed_member(&ledger, 7, "Sam Field", "EXPIRED");
        let dir = directory(ledger);

        let number = MemberNumber::parse("7").unwrap();
        let ineligible = dir.resolve_eligible(&number).await.unwrap_err();
        let missing = dir
            .resolve_eligible(&MemberNumber::parse("9999").unwrap())
            .await
            .unwrap_err();
        assert_eq!(format!("{ineligible}"), format!("{missing}"));
    }

    #[tokio::test]
    async fn reminder_lookup_skips_eligibility() {
        let ledger = Arc::new(MockLedger::new(now()));
        seed_member(&ledger, 7, "Sam Field", "EXPIRED");
        let dir = directory(ledger);

        let member = dir.resolve_by_number(7).await.unwrap();
        assert!(member.is_some());
    }

    #[tokio::test]
    async fn short_search_returns_nothing_without_a_query() {
        let ledger = Arc::new(MockLedger::new(now()));
        seed_member(&ledger, 7, "Sam Field", "AM");
        let dir = directory(ledger.clone());

        assert!(dir.search("s").await.unwrap().is_empty());
        assert!(dir.search("  ").await.unwrap().is_empty());
        assert_eq!(ledger.call_count(), 0);
    }

    #[tokio::test]
    async fn search_drops_incomplete_records() {
        let ledger = Arc::new(MockLedger::new(now()));
        seed_member(&ledger, 7, "Sam Field", "AM");
        ledger.insert(
            "Members",
            FieldsBuilder::new()
                .str("Full Name", "Sam Nameless")
                .str("Membership Type", "AM")
                .build(),
        );
        let dir = directory(ledger);

        let hits = dir.search("sam").await.unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].number.as_deref(), Some("7"));
    }
}
