//! effects.rs
//!
//! 능력 효과 해석기. 모든 시전 진입점이 이 모듈 하나를 거칩니다.

use serde::Serialize;
use tracing::{debug, info};

use crate::{
    card::{
        types::{InstanceId, PlayerSlot, TargetType},
        Card,
    },
    exception::MatchCorruption,
};

use super::{
    state::{MatchState, TimedBuff},
    validation::CastPlan,
};

/// 빙결 지속 턴 수 (중첩되지 않고 갱신됨)
pub const FREEZE_DURATION: u32 = 2;

/// 시전 한 번에 쓰인 수치들
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EffectAmounts {
    pub damage: u32,
    pub heal: u32,
    pub shield: u32,
    pub freeze: bool,
}

/// 대상 하나에 대한 해석 결과
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TargetOutcome {
    pub target_id: InstanceId,
    pub absorbed: u32,
    pub damage_taken: u32,
    pub healed: u32,
    pub shield_gained: u32,
    pub frozen: bool,
    pub died: bool,
}

/// 해석된 능력 하나의 기록
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolvedEffect {
    pub source_id: InstanceId,
    pub caster: PlayerSlot,
    pub ability_name: String,
    pub ability_index: usize,
    pub target_type: TargetType,
    pub target_ids: Vec<InstanceId>,
    pub amounts: EffectAmounts,
    pub outcomes: Vec<TargetOutcome>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SkipReason {
    /// 행동 가능한(살아있고 얼지 않은) 카드가 없음
    AllFrozen,
    /// 남은 사용 가능 능력이 없음 (once_per_match 정책)
    Exhausted,
}

/// 출력 큐 항목. 표현 계층 전용입니다.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum EffectRecord {
    Ability(ResolvedEffect),
    #[serde(rename_all = "camelCase")]
    Death {
        instance_id: InstanceId,
        owner: PlayerSlot,
    },
    #[serde(rename_all = "camelCase")]
    TurnSkipped {
        player: PlayerSlot,
        reason: SkipReason,
        turn_number: u32,
    },
    #[serde(rename_all = "camelCase")]
    BuffExpired {
        player: PlayerSlot,
        ability_name: String,
    },
}

/// 보호막 우선 피해 적용 결과
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DamageOutcome {
    pub absorbed: u32,
    pub damage_taken: u32,
    pub killed: bool,
}

/// 보호막으로 먼저 흡수한 뒤 남은 피해를 체력에서 뺍니다. 체력은 0 아래로 내려가지 않습니다.
pub fn apply_damage(card: &mut Card, damage: u32) -> DamageOutcome {
    let absorbed = card.shields.min(damage);
    card.shields -= absorbed;
    let remaining = damage - absorbed;
    let before = card.current_health;
    card.current_health = card.current_health.saturating_sub(remaining);
    DamageOutcome {
        absorbed,
        damage_taken: before - card.current_health,
        killed: card.current_health == 0,
    }
}

/// 체력을 회복합니다. 죽은 카드는 되살리지 않습니다.
pub fn apply_heal(card: &mut Card, heal: u32) -> u32 {
    if !card.is_alive() {
        return 0;
    }
    let before = card.current_health;
    card.current_health = card.max_health.min(card.current_health.saturating_add(heal));
    card.current_health - before
}

/// 로스터에서 묘지로 옮깁니다. 한 번의 호출 안에서 제거와 추가가 함께 일어납니다.
fn send_to_graveyard(state: &mut MatchState, id: InstanceId) -> Option<PlayerSlot> {
    let (slot, idx) = state.locate_active(id)?;
    let player = state.player_mut(slot);
    let card = player.cards.remove(idx);
    player.graveyard.push(card);
    Some(slot)
}

/// 검증된 시전 계획을 상태에 적용합니다.
///
/// 대상마다 1) 피해 2) 사망 처리 3) 회복 4) 보호막 5) 빙결 순서로 적용하고,
/// 마지막으로 6) 시전자 측 버프를 붙입니다.
pub fn resolve(state: &mut MatchState, plan: &CastPlan) -> Result<ResolvedEffect, MatchCorruption> {
    let (ability, source_name) = state
        .find_card(plan.source)
        .and_then(|card| {
            card.abilities
                .get(plan.ability_index)
                .map(|a| (a.clone(), card.name.clone()))
        })
        .ok_or(MatchCorruption::UnresolvablePlan {
            card: plan.source,
            ability_index: plan.ability_index,
        })?;

    let damage = if ability.damage > 0 {
        ability
            .damage
            .saturating_add(state.player(plan.caster).damage_bonus())
    } else {
        0
    };
    let amounts = EffectAmounts {
        damage,
        heal: ability.heal,
        shield: ability.shield,
        freeze: ability.freeze,
    };

    debug!(
        "{} ({}) casts '{}' on {} target(s)",
        source_name,
        plan.source,
        ability.name,
        plan.targets.len()
    );

    let mut outcomes = Vec::with_capacity(plan.targets.len());
    let mut deaths = Vec::new();

    for &target_id in &plan.targets {
        let target = state
            .active_card_mut(target_id)
            .ok_or(MatchCorruption::TargetLeftRoster(target_id))?;

        let mut outcome = TargetOutcome {
            target_id,
            absorbed: 0,
            damage_taken: 0,
            healed: 0,
            shield_gained: 0,
            frozen: false,
            died: false,
        };

        // 1. 피해 (보호막 우선)
        if damage > 0 {
            let dmg = apply_damage(target, damage);
            outcome.absorbed = dmg.absorbed;
            outcome.damage_taken = dmg.damage_taken;
            outcome.died = dmg.killed;
        }

        // 2. 사망 시 묘지로 이동, 이후 단계는 건너뜀
        if outcome.died {
            if let Some(owner) = send_to_graveyard(state, target_id) {
                info!("card {} of player {} was destroyed", target_id, owner);
                deaths.push((target_id, owner));
            }
            outcomes.push(outcome);
            continue;
        }

        // 3. 회복
        if ability.heal > 0 {
            outcome.healed = apply_heal(target, ability.heal);
        }

        // 4. 보호막 (상한 없음)
        if ability.shield > 0 {
            let before = target.shields;
            target.shields = target.shields.saturating_add(ability.shield);
            outcome.shield_gained = target.shields - before;
        }

        // 5. 빙결 (지속 시간 갱신)
        if ability.freeze {
            target.frozen_turns = FREEZE_DURATION;
            outcome.frozen = true;
        }

        outcomes.push(outcome);
    }

    // 6. 시전자 측 버프
    if let Some(buff) = ability.buff {
        if buff.turns > 0 {
            state.player_mut(plan.caster).buffs.push(TimedBuff {
                source_id: plan.source,
                ability_name: ability.name.clone(),
                amount: buff.amount,
                remaining_turns: buff.turns,
            });
        }
    }

    // 시전자가 자기 능력으로 죽었을 수도 있으므로 묘지까지 찾습니다.
    if let Some(caster) = state.any_card_mut(plan.source) {
        if let Some(uses) = caster.ability_uses.get_mut(plan.ability_index) {
            *uses = uses.saturating_add(1);
        }
    }

    let resolved = ResolvedEffect {
        source_id: plan.source,
        caster: plan.caster,
        ability_name: ability.name.clone(),
        ability_index: plan.ability_index,
        target_type: ability.target_type,
        target_ids: plan.targets.clone(),
        amounts,
        outcomes,
    };

    state.effects.push(EffectRecord::Ability(resolved.clone()));
    for (instance_id, owner) in deaths {
        state.effects.push(EffectRecord::Death { instance_id, owner });
    }

    Ok(resolved)
}
