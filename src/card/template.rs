use serde::{Deserialize, Serialize};

use crate::{
    exception::CardError,
    game::determinism::uuid_v4_from_seed,
};

use super::{
    types::{InstanceId, PlayerSlot},
    Ability, Card,
};

/// 카드 인스턴스 id 를 만들 때 쓰는 네임스페이스 ("CARD")
const CARD_NAMESPACE: u64 = 0x4341_5244;

/// 추상적인 장난감 정의. 팀 제출 시 클라이언트가 보내는 형태이기도 합니다.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CardTemplate {
    pub name: String,
    #[serde(default)]
    pub display_asset: String,
    pub max_health: u32,
    #[serde(default)]
    pub attack: u32,
    #[serde(default)]
    pub defense: u32,
    #[serde(default)]
    pub speed: u32,
    pub abilities: Vec<Ability>,
}

/// 템플릿으로부터 새 카드 인스턴스를 만듭니다.
///
/// 인스턴스 id 는 `(seed, owner, roster_index)` 로부터 결정적으로 만들어지므로
/// 같은 매치 안에서 유일합니다.
pub fn instantiate_card(
    template: &CardTemplate,
    owner: PlayerSlot,
    roster_index: usize,
    seed: u64,
) -> Result<Card, CardError> {
    if template.name.trim().is_empty() {
        return Err(CardError::InvalidTemplate("template has no name".into()));
    }
    if template.abilities.is_empty() {
        return Err(CardError::InvalidTemplate(format!(
            "template '{}' has no abilities",
            template.name
        )));
    }
    if template.max_health == 0 {
        return Err(CardError::InvalidTemplate(format!(
            "template '{}' has zero max health",
            template.name
        )));
    }
    if let Some(ability) = template.abilities.iter().find(|a| a.name.trim().is_empty()) {
        return Err(CardError::InvalidTemplate(format!(
            "template '{}' has an unnamed ability ({:?})",
            template.name, ability.target_type
        )));
    }

    let index = ((owner.index() as u64) << 32) | roster_index as u64;
    let instance_id = InstanceId::from(uuid_v4_from_seed(seed, CARD_NAMESPACE, index));

    Ok(Card {
        instance_id,
        owner,
        position: roster_index,
        name: template.name.clone(),
        display_asset: template.display_asset.clone(),
        max_health: template.max_health,
        current_health: template.max_health,
        attack: template.attack,
        defense: template.defense,
        speed: template.speed,
        shields: 0,
        frozen_turns: 0,
        abilities: template.abilities.clone(),
        ability_uses: vec![0; template.abilities.len()],
    })
}
