use crate::loadout::Picks;
use crate::{shuffle, Category, Quota, QuotaConfig, RandomSource, RuleSet, Stratagem};

/// How many stratagems of `category` a loadout may hold. A pin is both floor
/// and ceiling; otherwise the tightest active rule applies; otherwise `None`.
pub fn effective_cap(category: Category, quotas: &QuotaConfig, rules: &RuleSet) -> Option<usize> {
    if let Quota::Exact(count) = quotas.get(category) {
        return Some(count as usize);
    }
    rules.cap_for(category).map(usize::from)
}

/// Second pass: one shuffle of everything still unused, walked in order.
pub(crate) fn fill_remaining<'a>(
    pool: &[&'a Stratagem],
    quotas: &QuotaConfig,
    rules: &RuleSet,
    picks: &mut Picks<'a>,
    rng: &mut dyn RandomSource,
) {
    if picks.is_full() {
        return;
    }
    let mut candidates: Vec<&'a Stratagem> = pool
        .iter()
        .copied()
        .filter(|stratagem| !picks.contains(&stratagem.id))
        .collect();
    shuffle(&mut candidates, rng);
    for stratagem in candidates {
        if picks.is_full() {
            break;
        }
        let cap = effective_cap(stratagem.category, quotas, rules);
        if cap.is_some_and(|max| picks.count(stratagem.category) >= max) {
            continue;
        }
        picks.push(stratagem);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::RuleKey;

    #[test]
    fn pin_overrides_rule_cap() {
        let rules: RuleSet = [RuleKey::NoDoubleBackpack].into_iter().collect();
        let mut quotas = QuotaConfig::default();
        assert_eq!(effective_cap(Category::Backpack, &quotas, &rules), Some(1));
        assert_eq!(effective_cap(Category::Orbital, &quotas, &rules), None);
        quotas.pin(Category::Orbital, 0).unwrap();
        assert_eq!(effective_cap(Category::Orbital, &quotas, &rules), Some(0));
    }
}
