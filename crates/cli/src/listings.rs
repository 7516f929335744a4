use std::fmt::Write;

use colored::Colorize;
use launchpad_sdk::{
    num::Converter,
    page::{ListingsStatus, Page, Panel},
    sync::{Severity, Snapshot, SyncEvent},
};
use tabled::{Table, settings::Style};

/// Renders page state: create button, last sync outcome and listings.
pub(crate) fn format(page: &Page, snapshot: &Snapshot, event: &SyncEvent) -> String {
    let mut out = String::new();
    _ = writeln!(out, "{}\n", format!("{:#^120}", " New Listings ").bold().purple());

    if let Some(factory) = snapshot.factory() {
        _ = writeln!(
            out,
            "Chain {} :: Factory {} :: Fee {} ETH :: {}",
            factory.chain_id(),
            factory.address(),
            Converter::ETHER.display(snapshot.fee()),
            factory.instant(),
        );
    }

    let label = page.create_label(snapshot);
    _ = writeln!(
        out,
        "{}",
        if page.can_create(snapshot) { label.green() } else { label.bright_black() }
    );

    let status = event.to_string();
    _ = writeln!(
        out,
        "{}\n",
        match event.severity() {
            Severity::Info => status.bright_black(),
            Severity::Warning => status.yellow(),
            Severity::Error => status.red(),
        }
    );

    match page.listings(snapshot) {
        ListingsStatus::Tokens(tokens) => {
            let mut table = Table::new(tokens);
            table.with(Style::sharp());
            _ = writeln!(out, "{}", table);
        },
        status => {
            _ = writeln!(out, "{}", status);
        },
    }

    for panel in page.panels(snapshot) {
        match panel {
            Panel::Create { factory, fee } => {
                _ = writeln!(
                    out,
                    "\n{} on {} for {} ETH",
                    "Create panel".blue(),
                    factory,
                    Converter::ETHER.display(fee)
                );
            },
            Panel::Trade { token, .. } => {
                _ = writeln!(
                    out,
                    "\n{} {}",
                    "Trade panel".blue(),
                    token.map(|t| t.name()).unwrap_or("-")
                );
            },
        }
    }

    out
}

pub(crate) fn render(page: &Page, snapshot: &Snapshot, event: &SyncEvent) {
    print!("{}", format(page, snapshot, event));
}
