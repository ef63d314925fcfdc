//! Bank/office specific extraction workarounds.
//!
//! Every rule whose condition holds is applied; later rules never undo
//! earlier ones because no two rules touch the same field.

use crate::models::statement::{
    Bank, ExtractionOptions, Office, WorkaroundFlags, NBC_CROP_REGION,
};

/// A single workaround: a condition and the change it makes.
struct Rule {
    applies: fn(Bank, Office) -> bool,
    apply: fn(&mut ExtractionOptions, &mut WorkaroundFlags),
}

const RULES: [Rule; 4] = [
    // CRDB Dar statements confuse both lattice and stream; let the extractor guess.
    Rule {
        applies: |bank, office| bank == Bank::Crdb && office == Office::Dar,
        apply: |options, _| {
            options.lattice = Some(false);
            options.stream = Some(false);
        },
    },
    // NBC loses the last digit of dates, except Dodoma's layout.
    Rule {
        applies: |bank, office| bank == Bank::Nbc && office != Office::Dodoma,
        apply: |_, flags| flags.repair_dates = true,
    },
    Rule {
        applies: |_, office| office == Office::Katavi,
        apply: |_, flags| flags.requires_ocr = true,
    },
    Rule {
        applies: |bank, _| bank == Bank::Nbc,
        apply: |options, flags| {
            flags.requires_ocr = true;
            options.crop_region = Some(NBC_CROP_REGION);
        },
    },
];

/// Derive extraction options and flags for a bank and office.
pub fn configure(bank: Bank, office: Office) -> (ExtractionOptions, WorkaroundFlags) {
    let mut options = ExtractionOptions::default();
    let mut flags = WorkaroundFlags::default();

    for rule in RULES.iter().filter(|rule| (rule.applies)(bank, office)) {
        (rule.apply)(&mut options, &mut flags);
    }

    (options, flags)
}
