//! End-to-end pipeline tests against the in-memory storage backend.

use std::sync::Arc;

use serde_json::{json, Value as JsonValue};

use panelbill_core::{PriceTable, Tier};
use panelbill_parties::{NewRepresentative, NewSalesCollaborator, RepresentativeUpdate};

use crate::pipeline::seed::SEED_REPRESENTATIVE_CODE;
use crate::{
    seed_baseline, ExportOptions, PipelineConfig, PipelineError, UsageExportService,
};
use crate::storage::{InMemoryStorage, Storage};

fn tier1_pricing(unit_price: i64) -> PriceTable {
    let mut prices = PriceTable::zero();
    prices.set(Tier::from_index(0).unwrap(), unit_price);
    prices
}

fn service(default_pricing: PriceTable) -> UsageExportService<Arc<InMemoryStorage>> {
    let config = PipelineConfig {
        default_pricing,
        tax_rate: 0.09,
        due_in_days: 30,
    };
    UsageExportService::new(Arc::new(InMemoryStorage::new()), config).unwrap()
}

fn usage_row(code: &str, tier1_volume: &str) -> JsonValue {
    json!({
        "admin_username": code,
        "limited_1_month_volume": tier1_volume,
        "unlimited_1_month": "0"
    })
}

#[test]
fn single_row_export_creates_a_taxed_invoice_for_a_new_representative() {
    // 10 units at 1000 with 9% tax: lines 10_000 + 900, total 10_900.
    let service = service(tier1_pricing(1_000));
    let payload = json!([usage_row("rep1", "10")]);

    let report = service
        .process_usage_export(&payload, &ExportOptions::default())
        .unwrap();

    assert!(report.is_success());
    assert_eq!(report.total_records, 1);
    assert_eq!(report.invoices_created, 1);
    assert_eq!(report.newly_onboarded, vec!["rep1".to_string()]);
    assert!(report.atomic_per_record);
    assert!(report.representative_pricing_applied);

    let storage = service.storage();
    let rep = storage.representative_by_code("rep1").unwrap().unwrap();
    assert_eq!(rep.balance, -10_900);

    let invoices = storage.invoices_for_representative(rep.id).unwrap();
    assert_eq!(invoices.len(), 1);
    assert_eq!(invoices[0].total_amount, 10_900);

    let items = storage.invoice_items(invoices[0].id).unwrap();
    let totals: Vec<i64> = items.iter().map(|i| i.total).collect();
    assert_eq!(totals, vec![10_000, 900]);
    assert_eq!(totals.iter().sum::<i64>(), invoices[0].total_amount);
}

#[test]
fn wrapped_payload_processes_identically_to_a_flat_one() {
    let flat = service(tier1_pricing(1_000));
    let wrapped = service(tier1_pricing(1_000));

    let flat_report = flat
        .process_usage_export(&json!([usage_row("rep1", "10")]), &ExportOptions::default())
        .unwrap();
    let wrapped_report = wrapped
        .process_usage_export(
            &json!([{"type": "table", "data": [usage_row("rep1", "10")]}]),
            &ExportOptions::default(),
        )
        .unwrap();

    assert_eq!(flat_report, wrapped_report);
}

#[test]
fn non_array_payload_fails_the_whole_run() {
    let service = service(tier1_pricing(1_000));
    let err = service
        .process_usage_export(&json!({"admin_username": "rep1"}), &ExportOptions::default())
        .unwrap_err();
    match err {
        PipelineError::InvalidPayload(_) => {}
        _ => panic!("Expected InvalidPayload"),
    }
}

#[test]
fn all_zero_usage_creates_nothing_and_counts_as_skipped() {
    let service = service(tier1_pricing(1_000));
    let payload = json!([usage_row("rep1", "0")]);

    let report = service
        .process_usage_export(&payload, &ExportOptions::default())
        .unwrap();

    assert!(report.is_success());
    assert_eq!(report.invoices_created, 0);
    assert_eq!(report.skipped_empty, vec!["rep1".to_string()]);

    // The representative was still onboarded, with an untouched balance.
    let rep = service
        .storage()
        .representative_by_code("rep1")
        .unwrap()
        .unwrap();
    assert_eq!(rep.balance, 0);
    assert!(service
        .storage()
        .invoices_for_representative(rep.id)
        .unwrap()
        .is_empty());
}

#[test]
fn inactive_representative_is_skipped_without_writes() {
    let service = service(tier1_pricing(1_000));
    let storage = service.storage();
    let rep = storage
        .create_representative(
            NewRepresentative::new("rep1", "Rep One", tier1_pricing(1_000)).unwrap(),
        )
        .unwrap();
    storage
        .update_representative(
            rep.id,
            RepresentativeUpdate {
                is_active: Some(false),
                ..Default::default()
            },
        )
        .unwrap();

    let report = service
        .process_usage_export(&json!([usage_row("rep1", "10")]), &ExportOptions::default())
        .unwrap();

    assert!(report.is_success());
    assert_eq!(report.invoices_created, 0);
    assert_eq!(report.skipped_inactive, vec!["rep1".to_string()]);

    let stored = storage.representative_by_code("rep1").unwrap().unwrap();
    assert_eq!(stored.balance, 0);
    assert!(storage.invoices_for_representative(rep.id).unwrap().is_empty());
}

#[test]
fn unknown_code_fails_the_record_when_auto_create_is_off() {
    let service = service(tier1_pricing(1_000));
    let options = ExportOptions {
        auto_create_representatives: false,
        ..ExportOptions::default()
    };

    let report = service
        .process_usage_export(&json!([usage_row("ghost", "10")]), &options)
        .unwrap();

    assert!(!report.is_success());
    assert_eq!(report.invoices_created, 0);
    assert_eq!(report.failures.len(), 1);
    assert_eq!(report.failures[0].identifier, "ghost");
    assert!(service
        .storage()
        .representative_by_code("ghost")
        .unwrap()
        .is_none());
}

#[test]
fn one_bad_record_does_not_stop_the_run() {
    let service = service(tier1_pricing(1_000));
    let options = ExportOptions {
        auto_create_representatives: false,
        ..ExportOptions::default()
    };
    service
        .storage()
        .create_representative(
            NewRepresentative::new("rep1", "Rep One", tier1_pricing(1_000)).unwrap(),
        )
        .unwrap();

    let payload = json!([usage_row("ghost", "10"), usage_row("rep1", "10")]);
    let report = service.process_usage_export(&payload, &options).unwrap();

    assert_eq!(report.total_records, 2);
    assert_eq!(report.invoices_created, 1);
    assert_eq!(report.failures.len(), 1);
    assert_eq!(report.failures[0].identifier, "ghost");
}

#[test]
fn representative_pricing_can_be_bypassed() {
    let service = service(tier1_pricing(1_000));
    let storage = service.storage();
    // This representative carries its own, more expensive table.
    storage
        .create_representative(
            NewRepresentative::new("rep1", "Rep One", tier1_pricing(2_000)).unwrap(),
        )
        .unwrap();

    let options = ExportOptions {
        apply_representative_pricing: false,
        ..ExportOptions::default()
    };
    let report = service
        .process_usage_export(&json!([usage_row("rep1", "10")]), &options)
        .unwrap();
    assert_eq!(report.invoices_created, 1);
    assert!(!report.representative_pricing_applied);

    // Priced from the default table (1000/unit), not the representative's.
    let rep = storage.representative_by_code("rep1").unwrap().unwrap();
    let invoices = storage.invoices_for_representative(rep.id).unwrap();
    assert_eq!(invoices[0].total_amount, 10_900);
}

#[test]
fn representative_pricing_applies_by_default() {
    let service = service(tier1_pricing(1_000));
    let storage = service.storage();
    storage
        .create_representative(
            NewRepresentative::new("rep1", "Rep One", tier1_pricing(2_000)).unwrap(),
        )
        .unwrap();

    let report = service
        .process_usage_export(&json!([usage_row("rep1", "10")]), &ExportOptions::default())
        .unwrap();
    assert_eq!(report.invoices_created, 1);

    // 10 * 2000 = 20_000, plus 9% tax (1_800).
    let rep = storage.representative_by_code("rep1").unwrap().unwrap();
    let invoices = storage.invoices_for_representative(rep.id).unwrap();
    assert_eq!(invoices[0].total_amount, 21_800);
}

#[test]
fn balance_is_conserved_across_a_batch() {
    let service = service(tier1_pricing(1_000));
    let payload = json!([
        usage_row("rep1", "10"),
        usage_row("rep1", "5"),
        usage_row("rep2", "2")
    ]);

    let report = service
        .process_usage_export(&payload, &ExportOptions::default())
        .unwrap();
    assert!(report.is_success());
    assert_eq!(report.invoices_created, 3);
    // Only the first occurrence of a code onboards.
    assert_eq!(
        report.newly_onboarded,
        vec!["rep1".to_string(), "rep2".to_string()]
    );

    let storage = service.storage();
    let rep1 = storage.representative_by_code("rep1").unwrap().unwrap();
    let rep2 = storage.representative_by_code("rep2").unwrap().unwrap();

    let rep1_total: i64 = storage
        .invoices_for_representative(rep1.id)
        .unwrap()
        .iter()
        .map(|i| i.total_amount)
        .sum();
    assert_eq!(rep1.balance, -rep1_total);
    assert_eq!(rep1_total, 10_900 + 5_450);
    assert_eq!(rep2.balance, -2_180);
}

#[test]
fn discount_and_fee_flow_through_to_the_invoice() {
    let service = service(tier1_pricing(1_000));
    let payload = json!([{
        "admin_username": "rep1",
        "limited_1_month_volume": "10",
        "discount": "1000",
        "additional_fee": "500"
    }]);

    let report = service
        .process_usage_export(&payload, &ExportOptions::default())
        .unwrap();
    assert!(report.is_success());

    let storage = service.storage();
    let rep = storage.representative_by_code("rep1").unwrap().unwrap();
    let invoices = storage.invoices_for_representative(rep.id).unwrap();
    // (10_000 - 1_000 + 500) * 1.09 = 9_500 + 855.
    assert_eq!(invoices[0].total_amount, 10_355);

    let items = storage.invoice_items(invoices[0].id).unwrap();
    let descriptions: Vec<&str> = items.iter().map(|i| i.description.as_str()).collect();
    assert_eq!(
        descriptions,
        vec![
            "Metered 1-month - 10 units",
            "Discount",
            "Additional fee",
            "Tax (9%)"
        ]
    );
}

#[test]
fn commission_is_recorded_iff_a_collaborator_resolves() {
    let service = service(tier1_pricing(1_000));
    let storage = service.storage();
    let collaborator = storage
        .create_collaborator(NewSalesCollaborator::new("Sales Lead", 0.05).unwrap())
        .unwrap();
    storage
        .create_representative(
            NewRepresentative::new("rep1", "Rep One", tier1_pricing(1_000))
                .unwrap()
                .with_collaborator(collaborator.id),
        )
        .unwrap();

    let payload = json!([usage_row("rep1", "10"), usage_row("rep2", "10")]);
    let report = service
        .process_usage_export(&payload, &ExportOptions::default())
        .unwrap();
    assert_eq!(report.invoices_created, 2);

    // rep1's invoice carries a commission; rep2 (no collaborator) does not.
    let rep1 = storage.representative_by_code("rep1").unwrap().unwrap();
    let rep1_invoice = &storage.invoices_for_representative(rep1.id).unwrap()[0];
    let record = storage
        .commission_record_for_invoice(rep1_invoice.id)
        .unwrap()
        .unwrap();
    assert_eq!(record.commission_amount, 545);

    let rep2 = storage.representative_by_code("rep2").unwrap().unwrap();
    let rep2_invoice = &storage.invoices_for_representative(rep2.id).unwrap()[0];
    assert!(storage
        .commission_record_for_invoice(rep2_invoice.id)
        .unwrap()
        .is_none());

    let stored = storage.collaborator(collaborator.id).unwrap().unwrap();
    assert_eq!(stored.balance, 545);
}

#[test]
fn repeated_runs_keep_invoice_numbers_unique() {
    let service = service(tier1_pricing(1_000));
    let payload = json!([usage_row("rep1", "10")]);

    service
        .process_usage_export(&payload, &ExportOptions::default())
        .unwrap();
    service
        .process_usage_export(&payload, &ExportOptions::default())
        .unwrap();

    let storage = service.storage();
    let rep = storage.representative_by_code("rep1").unwrap().unwrap();
    let invoices = storage.invoices_for_representative(rep.id).unwrap();
    assert_eq!(invoices.len(), 2);
    assert_ne!(invoices[0].number, invoices[1].number);
    assert_eq!(rep.balance, -2 * 10_900);
}

#[test]
fn seeded_representative_earns_commission_on_export() {
    let storage = Arc::new(InMemoryStorage::new());
    seed_baseline(&storage).unwrap();

    let service = UsageExportService::new(storage.clone(), PipelineConfig::default()).unwrap();
    let payload = json!([usage_row(SEED_REPRESENTATIVE_CODE, "1")]);
    let report = service
        .process_usage_export(&payload, &ExportOptions::default())
        .unwrap();
    assert!(report.is_success());
    assert_eq!(report.invoices_created, 1);
    assert!(report.newly_onboarded.is_empty());

    // Default table tier 1 is 50_000; 9% tax makes 54_500, commission 5%.
    let rep = storage
        .representative_by_code(SEED_REPRESENTATIVE_CODE)
        .unwrap()
        .unwrap();
    let invoice = &storage.invoices_for_representative(rep.id).unwrap()[0];
    assert_eq!(invoice.total_amount, 54_500);

    let record = storage
        .commission_record_for_invoice(invoice.id)
        .unwrap()
        .unwrap();
    assert_eq!(record.commission_amount, 2_725);
    let collaborator = storage
        .collaborator(record.collaborator_id)
        .unwrap()
        .unwrap();
    assert_eq!(collaborator.balance, 2_725);
}

#[test]
fn report_counts_partition_the_processed_records() {
    let service = service(tier1_pricing(1_000));
    let storage = service.storage();
    let inactive = storage
        .create_representative(
            NewRepresentative::new("inactive", "Inactive Rep", tier1_pricing(1_000)).unwrap(),
        )
        .unwrap();
    storage
        .update_representative(
            inactive.id,
            RepresentativeUpdate {
                is_active: Some(false),
                ..Default::default()
            },
        )
        .unwrap();

    let payload = json!([
        usage_row("rep1", "10"),
        usage_row("inactive", "10"),
        usage_row("rep2", "0")
    ]);
    let report = service
        .process_usage_export(&payload, &ExportOptions::default())
        .unwrap();

    let summary = report.summary();
    assert_eq!(summary.total_records, 3);
    assert_eq!(
        summary.invoices_created
            + summary.skipped_inactive
            + summary.skipped_empty
            + summary.failed,
        summary.total_records
    );
}
