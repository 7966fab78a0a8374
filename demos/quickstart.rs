//! Drives the ledger end to end against a throwaway database: seed the
//! fixture lot, create a supply lot, then buy part of it and all of the rest.

use product_transfer::lot::{LotDraft, LotStatus};
use product_transfer::{Command, Dispatcher, Outcome, TransferService};
use std::sync::Arc;

fn main() -> anyhow::Result<()> {
    let db = sled::Config::new().temporary(true).open()?;
    let service = TransferService::new(Arc::new(db));
    let dispatcher = Dispatcher::new(service);

    dispatcher.dispatch(Command::InitLedger)?;

    let draft = LotDraft::new()
        .set_product_id("P-100")
        .set_name("Widget")
        .set_owner("Acme")
        .set_value("12$")
        .set_quantity(100)
        .set_expiration_date("01.01.2199")
        .set_manufactured_date("02.02.2020")
        .set_status(LotStatus::OnSale)
        .set_issue_date("03.03.2024")
        .set_supplier("Acme")
        .set_demander(" ");

    dispatcher.dispatch(Command::Create {
        key: "L1".into(),
        draft,
    })?;

    let remaining = dispatcher.dispatch(Command::Purchase {
        key: "L1".into(),
        new_owner: "Buyer".into(),
        quantity: 30,
    })?;
    println!("after partial purchase: {remaining:#?}");

    let depleted = dispatcher.dispatch(Command::Purchase {
        key: "L1".into(),
        new_owner: "Buyer".into(),
        quantity: 70,
    })?;
    println!("after depleting purchase: {depleted:#?}");

    match dispatcher.dispatch(Command::Read { key: "L1".into() }) {
        Ok(Outcome::Lot(lot)) => println!("unexpected survivor: {lot:?}"),
        Ok(other) => println!("unexpected outcome: {other:?}"),
        Err(err) => println!("source lot is gone as expected: {err}"),
    }

    Ok(())
}
