//! End-to-end lifecycle scenarios against a real (temporary) ledger.

use anyhow::Context;
use product_transfer::lot::{LotDraft, LotStatus};
use product_transfer::{Dispatcher, Outcome, TransferError, TransferService};
use std::sync::Arc;
use tempfile::tempdir;

// Sled uses file-based locking, so every test opens its own database under
// a temp directory that cleans itself up.
fn open_db(dir: &tempfile::TempDir, name: &str) -> anyhow::Result<Arc<sled::Db>> {
    let db = sled::open(dir.path().join(name))?;
    db.clear()?;
    Ok(Arc::new(db))
}

fn widget_draft(quantity: u32) -> LotDraft {
    LotDraft::new()
        .set_product_id("P-100")
        .set_name("Widget")
        .set_owner("Acme")
        .set_value("12$")
        .set_quantity(quantity)
        .set_expiration_date("01.01.2199")
        .set_manufactured_date("02.02.2020")
        .set_status(LotStatus::OnSale)
        .set_issue_date("03.03.2024")
        .set_supplier("Acme")
        .set_demander(" ")
}

#[test]
fn create_and_read_round_trip() -> anyhow::Result<()> {
    let temp_dir = tempdir()?;
    let service = TransferService::new(open_db(&temp_dir, "create_read.db")?);

    let created = service
        .add_lot("L1", widget_draft(100))
        .context("create failed: ")?;

    assert_eq!(created.key, "L1");
    assert_eq!(created.owner, "Acme");
    assert_eq!(created.quantity, 100);
    assert_eq!(created.status, LotStatus::OnSale);
    assert!(!created.last_update.is_empty());

    let read = service.lot_by_key("L1")?;
    assert_eq!(read, created);

    Ok(())
}

#[test]
fn double_create_is_rejected_without_effect() -> anyhow::Result<()> {
    let temp_dir = tempdir()?;
    let db = open_db(&temp_dir, "double_create.db")?;
    let service = TransferService::new(db.clone());

    let first = service.add_lot("L1", widget_draft(100))?;

    let second = service.add_lot("L1", widget_draft(5).set_owner("Impostor"));
    assert!(matches!(
        second,
        Err(TransferError::AlreadyExists { ref key }) if key == "L1"
    ));

    // The resident record is untouched.
    assert_eq!(service.lot_by_key("L1")?, first);

    // An empty-but-present sentinel also counts as existing.
    db.insert("S", Vec::<u8>::new())?;
    assert!(matches!(
        service.add_lot("S", widget_draft(1)),
        Err(TransferError::AlreadyExists { .. })
    ));

    Ok(())
}

#[test]
fn absent_key_fails_uniformly() -> anyhow::Result<()> {
    let temp_dir = tempdir()?;
    let service = TransferService::new(open_db(&temp_dir, "absent.db")?);

    assert!(matches!(
        service.lot_by_key("ghost"),
        Err(TransferError::NotFound { ref key }) if key == "ghost"
    ));
    assert!(matches!(
        service.change_ownership("ghost", "Buyer"),
        Err(TransferError::NotFound { .. })
    ));
    assert!(matches!(
        service.delete_lot("ghost"),
        Err(TransferError::NotFound { .. })
    ));
    assert!(matches!(
        service.purchase("ghost", "Buyer", 1),
        Err(TransferError::NotFound { .. })
    ));

    Ok(())
}

#[test]
fn partial_purchase_splits_the_lot() -> anyhow::Result<()> {
    let temp_dir = tempdir()?;
    let service = TransferService::new(open_db(&temp_dir, "partial.db")?);

    service.add_lot("L1", widget_draft(100))?;

    let remaining = service
        .purchase("L1", "Buyer", 30)
        .context("purchase failed: ")?;

    assert_eq!(remaining.key, "L1");
    assert_eq!(remaining.quantity, 70);
    assert_eq!(remaining.status, LotStatus::OnSale);
    assert_eq!(remaining.owner, "Acme");
    assert_eq!(service.lot_by_key("L1")?, remaining);

    let purchased = service.lot_by_key("Buyer_Widget_03.03.2024")?;
    assert_eq!(purchased.quantity, 30);
    assert_eq!(purchased.status, LotStatus::Purchased);
    assert_eq!(purchased.owner, "Buyer");
    assert_eq!(purchased.supplier, "Acme");
    assert_eq!(purchased.demander, "Buyer");
    // Dates carry over in source order on the partial branch.
    assert_eq!(purchased.manufactured_date, "02.02.2020");
    assert_eq!(purchased.expiration_date, "01.01.2199");
    assert_eq!(purchased.issue_date, "03.03.2024");

    assert_eq!(remaining.quantity + purchased.quantity, 100);

    Ok(())
}

#[test]
fn depleting_purchase_removes_the_source() -> anyhow::Result<()> {
    let temp_dir = tempdir()?;
    let service = TransferService::new(open_db(&temp_dir, "deplete.db")?);

    service.add_lot("L1", widget_draft(100))?;
    service.purchase("L1", "Buyer", 30)?;

    let purchased = service.purchase("L1", "Buyer", 70)?;
    assert_eq!(purchased.key, "Buyer_Widget_03.03.2024");
    assert_eq!(purchased.quantity, 70);
    assert_eq!(purchased.status, LotStatus::Purchased);

    assert!(matches!(
        service.lot_by_key("L1"),
        Err(TransferError::NotFound { .. })
    ));

    // Same buyer, same derived key: the depleting purchase replaced the
    // earlier purchased record.
    assert_eq!(service.lot_by_key("Buyer_Widget_03.03.2024")?, purchased);

    Ok(())
}

#[test]
fn depletion_stores_the_date_pair_swapped() -> anyhow::Result<()> {
    let temp_dir = tempdir()?;
    let service = TransferService::new(open_db(&temp_dir, "date_swap.db")?);

    service.add_lot("L1", widget_draft(50))?;
    let purchased = service.purchase("L1", "Buyer", 50)?;

    assert_eq!(purchased.manufactured_date, "01.01.2199");
    assert_eq!(purchased.expiration_date, "02.02.2020");

    Ok(())
}

#[test]
fn oversell_is_rejected_without_effect() -> anyhow::Result<()> {
    let temp_dir = tempdir()?;
    let service = TransferService::new(open_db(&temp_dir, "oversell.db")?);

    let before = service.add_lot("L1", widget_draft(10))?;

    assert!(matches!(
        service.purchase("L1", "Buyer", 11),
        Err(TransferError::SupplyNotEnough { ref key }) if key == "L1"
    ));

    assert_eq!(service.lot_by_key("L1")?, before);
    assert!(matches!(
        service.lot_by_key("Buyer_Widget_03.03.2024"),
        Err(TransferError::NotFound { .. })
    ));

    Ok(())
}

#[test]
fn separator_in_buyer_name_rejects_purchase_before_write() -> anyhow::Result<()> {
    let temp_dir = tempdir()?;
    let service = TransferService::new(open_db(&temp_dir, "separator.db")?);

    let before = service.add_lot("L1", widget_draft(10))?;

    assert!(matches!(
        service.purchase("L1", "Bad_Buyer", 5),
        Err(TransferError::InvalidArgument(_))
    ));
    assert_eq!(service.lot_by_key("L1")?, before);

    Ok(())
}

#[test]
fn ownership_transfer_touches_only_owner_status_and_stamp() -> anyhow::Result<()> {
    let temp_dir = tempdir()?;
    let service = TransferService::new(open_db(&temp_dir, "transfer.db")?);

    let before = service.add_lot("L1", widget_draft(42))?;
    let after = service.change_ownership("L1", "NewCo")?;

    assert_eq!(after.owner, "NewCo");
    assert_eq!(after.status, LotStatus::Changed);
    assert_eq!(after.key, before.key);
    assert_eq!(after.quantity, before.quantity);
    assert_eq!(after.product_id, before.product_id);
    assert_eq!(after.value, before.value);
    assert_eq!(after.expiration_date, before.expiration_date);
    assert_eq!(after.manufactured_date, before.manufactured_date);
    assert_eq!(after.issue_date, before.issue_date);
    assert_eq!(after.supplier, before.supplier);
    assert_eq!(after.demander, before.demander);

    assert_eq!(service.lot_by_key("L1")?, after);

    // Status stays an audit label: a changed lot can still be purchased.
    let remaining = service.purchase("L1", "Buyer", 2)?;
    assert_eq!(remaining.quantity, 40);

    Ok(())
}

#[test]
fn delete_removes_the_record() -> anyhow::Result<()> {
    let temp_dir = tempdir()?;
    let service = TransferService::new(open_db(&temp_dir, "delete.db")?);

    service.add_lot("L1", widget_draft(10))?;
    service.delete_lot("L1")?;

    assert!(matches!(
        service.lot_by_key("L1"),
        Err(TransferError::NotFound { .. })
    ));

    Ok(())
}

#[test]
fn init_ledger_seeds_the_first_lot() -> anyhow::Result<()> {
    let temp_dir = tempdir()?;
    let service = TransferService::new(open_db(&temp_dir, "seed.db")?);

    service.init_ledger()?;

    let seeded = service.lot_by_key("1")?;
    assert_eq!(seeded.key, "FirstOwner_FirstProduct_00.00.2000");
    assert_eq!(seeded.name, "FirstProduct");
    assert_eq!(seeded.owner, "FirstOwner");
    assert_eq!(seeded.quantity, 70);
    assert_eq!(seeded.status, LotStatus::OnSale);

    Ok(())
}

#[test]
fn corrupt_record_surfaces_a_decode_fault() -> anyhow::Result<()> {
    let temp_dir = tempdir()?;
    let db = open_db(&temp_dir, "corrupt.db")?;
    let service = TransferService::new(db.clone());

    db.insert("L1", &b"not a lot"[..])?;

    assert!(matches!(
        service.lot_by_key("L1"),
        Err(TransferError::Deserialization { ref key, .. }) if key == "L1"
    ));

    Ok(())
}

#[test]
fn dispatcher_routes_string_invocations() -> anyhow::Result<()> {
    let temp_dir = tempdir()?;
    let service = TransferService::new(open_db(&temp_dir, "dispatch.db")?);
    let dispatcher = Dispatcher::new(service);

    let args: Vec<String> = [
        "L1",
        "P-100",
        "Widget",
        "Acme",
        "12$",
        "100",
        "01.01.2199",
        "02.02.2020",
        "on sale",
        "03.03.2024",
        "Acme",
        " ",
    ]
    .into_iter()
    .map(String::from)
    .collect();

    let Outcome::Lot(lot) = dispatcher.invoke("create", &args)? else {
        panic!("create did not return a lot");
    };
    assert_eq!(lot.quantity, 100);

    let purchase_args: Vec<String> =
        ["L1", "Buyer", "30"].into_iter().map(String::from).collect();
    let Outcome::Lot(remaining) = dispatcher.invoke("purchase", &purchase_args)? else {
        panic!("purchase did not return a lot");
    };
    assert_eq!(remaining.quantity, 70);

    let deleted = dispatcher.invoke("delete", &["L1".to_string()])?;
    assert_eq!(
        deleted,
        Outcome::Deleted {
            key: "L1".to_string()
        }
    );

    // A malformed quantity is a caller error, not an oversell.
    let bad_args: Vec<String> =
        ["Buyer_Widget_03.03.2024", "Other", "many"]
            .into_iter()
            .map(String::from)
            .collect();
    let err = dispatcher.invoke("purchase", &bad_args).unwrap_err();
    assert!(matches!(
        err.downcast_ref::<TransferError>(),
        Some(TransferError::InvalidArgument(_))
    ));

    let err = dispatcher.invoke("frobnicate", &[]).unwrap_err();
    assert!(matches!(
        err.downcast_ref::<TransferError>(),
        Some(TransferError::InvalidArgument(_))
    ));

    Ok(())
}
