use rk_money::{Micros, Percent};
use rk_tables::{ListType, MarginMode, MatchedRate, PriceList, RateKey, Shipment};
use rk_tax::{convert, VatMode, VatRate};

use crate::{Anomaly, CalculationResult, MarginError, MarginPolicy, MarginSource};

#[derive(Copy, Clone, Debug)]
enum Configured {
    Percent(Percent),
    Fixed(Micros),
}

#[derive(Copy, Clone, Debug)]
enum Branch {
    Configured(Configured),
    /// `explicit` is false when the override was inferred from prices.
    Override { explicit: bool },
    ProcessDefault,
}

/// One list's matched rate, normalized to VAT-exclusive micros.
struct Priced {
    rate: MatchedRate,
    excl: Micros,
}

fn vat_of(list: &PriceList) -> Result<VatRate, MarginError> {
    list.vat().map_err(|source| MarginError::Tax {
        list_id: list.id.clone(),
        source,
    })
}

fn price_excl(list: &PriceList, key: &RateKey, shipment: &Shipment) -> Result<Priced, MarginError> {
    let vat = vat_of(list)?;
    let rate = list
        .rate_for(key, shipment.service_type, shipment.weight, &shipment.charges)
        .map_err(|source| MarginError::Rate {
            list_id: list.id.clone(),
            source,
        })?;
    let excl = convert(rate.breakdown.total, list.vat_mode, VatMode::Excluded, vat).map_err(|source| {
        MarginError::Tax {
            list_id: list.id.clone(),
            source,
        }
    })?;
    Ok(Priced { rate, excl })
}

/// Resolve margin and final price for `list` (usually a custom list).
///
/// `master` must be the list named by `list`'s `master_list_id`, or `None`
/// when it has none. Supplier lists are priced against themselves.
pub fn resolve(
    list: &PriceList,
    master: Option<&PriceList>,
    key: &RateKey,
    shipment: &Shipment,
    policy: &MarginPolicy,
) -> Result<CalculationResult, MarginError> {
    let list_id = &list.id;
    let overflow = || MarginError::Overflow {
        list_id: list_id.clone(),
    };

    match (list.master_list_id(), master) {
        (Some(expected), None) => {
            return Err(MarginError::MissingMaster {
                list_id: list_id.clone(),
                master_list_id: expected.clone(),
            })
        }
        (Some(expected), Some(m)) if *expected == m.id => {}
        (None, None) => {}
        (expected, got) => {
            return Err(MarginError::MasterMismatch {
                list_id: list_id.clone(),
                expected: expected.cloned(),
                got: got.map(|m| m.id.clone()),
            })
        }
    }

    // Supplier cost first, before any margin decision.
    let supplier = master.map(|m| price_excl(m, key, shipment)).transpose()?;
    let own = price_excl(list, key, shipment)?;
    let vat = vat_of(list)?;

    let list_price = own.excl.round_cents();
    let supplier_price = match (&list.list_type, &supplier) {
        (_, Some(s)) => Some(s.excl.round_cents()),
        (ListType::Supplier, None) => Some(list_price),
        (ListType::Custom { .. }, None) => None,
    };
    let cost = supplier_price.unwrap_or(list_price);

    let branch = choose_branch(list, list_price, supplier_price, policy)?;

    let (margin, final_excl) = match branch {
        Branch::Configured(Configured::Percent(p)) => {
            let m = cost.percent_of(p).ok_or_else(overflow)?.round_cents();
            (m, cost.checked_add(m).ok_or_else(overflow)?)
        }
        Branch::Configured(Configured::Fixed(f)) => {
            let m = f.round_cents();
            (m, cost.checked_add(m).ok_or_else(overflow)?)
        }
        Branch::Override { .. } => (list_price.checked_sub(cost).ok_or_else(overflow)?, list_price),
        Branch::ProcessDefault => {
            let m = cost
                .percent_of(policy.default_margin_percent)
                .ok_or_else(overflow)?
                .round_cents();
            (m, cost.checked_add(m).ok_or_else(overflow)?)
        }
    };

    let mut anomalies = Vec::new();
    if margin.is_negative() {
        if let Branch::Override { explicit: false } = branch {
            return Err(MarginError::NegativeMargin {
                list_id: list_id.clone(),
                margin,
            });
        }
        anomalies.push(Anomaly::NegativeMargin { margin });
    }
    if final_excl.is_negative() {
        return Err(MarginError::NegativeFinalPrice {
            list_id: list_id.clone(),
            final_price: final_excl,
        });
    }

    // An inclusive override bills the stored gross; re-grossing the net can move it by a cent.
    let (vat_amount, total_price_with_vat) = match (branch, list.vat_mode) {
        (Branch::Override { .. }, VatMode::Included) => {
            let gross = own.rate.breakdown.total.round_cents();
            (gross.checked_sub(list_price).ok_or_else(overflow)?, gross)
        }
        _ => with_vat(final_excl, vat).ok_or_else(overflow)?,
    };
    let final_price = match list.vat_mode {
        VatMode::Excluded => final_excl,
        VatMode::Included => total_price_with_vat,
    };

    Ok(CalculationResult {
        list_id: list_id.clone(),
        master_list_id: master.map(|m| m.id.clone()),
        base_price: own.rate.breakdown.base_price,
        surcharges: own.rate.breakdown.surcharges,
        total_cost: cost,
        supplier_price,
        list_price,
        margin,
        margin_source: match branch {
            Branch::Configured(_) => MarginSource::Configured,
            Branch::Override { .. } => MarginSource::ListOverride,
            Branch::ProcessDefault => MarginSource::ProcessDefault,
        },
        final_price,
        vat_mode: list.vat_mode,
        vat_rate: vat.percent(),
        vat_amount,
        total_price_with_vat,
        matched_entry: own.rate.entry,
        supplier_entry: supplier.map(|s| s.rate.entry),
        anomalies,
    })
}

fn choose_branch(
    list: &PriceList,
    list_price: Micros,
    supplier_price: Option<Micros>,
    policy: &MarginPolicy,
) -> Result<Branch, MarginError> {
    // Percent wins when both are set.
    let configured = list
        .default_margin_percent
        .map(Configured::Percent)
        .or(list.default_margin_fixed.map(Configured::Fixed));

    let branch = match (list.margin_mode, configured) {
        (Some(MarginMode::Configured), Some(c)) => Branch::Configured(c),
        (Some(MarginMode::Configured), None) => {
            return Err(MarginError::MarginNotConfigured {
                list_id: list.id.clone(),
            })
        }
        (Some(MarginMode::Override), _) => Branch::Override { explicit: true },
        (Some(MarginMode::Inherited), _) => Branch::ProcessDefault,
        (None, Some(c)) => Branch::Configured(c),
        (None, None) => match supplier_price {
            Some(s) if !list_price.within(s, policy.epsilon) => Branch::Override { explicit: false },
            _ => Branch::ProcessDefault,
        },
    };
    Ok(branch)
}

/// `(vat, net + vat)` with both parts rounded to cents.
fn with_vat(net: Micros, vat: VatRate) -> Option<(Micros, Micros)> {
    let net = net.round_cents();
    let tax = vat.tax_on(net).ok()?.round_cents();
    Some((tax, net.checked_add(tax)?))
}
