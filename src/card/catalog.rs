//! 기본 덱 카탈로그
//!
//! 팀 제출 시 빈 목록을 보내거나 AI 좌석이 팀을 제출할 때 사용됩니다.

use once_cell::sync::Lazy;

use super::{template::CardTemplate, types::PlayerSlot, Ability, types::TargetType};

fn toy(
    name: &str,
    asset: &str,
    max_health: u32,
    attack: u32,
    abilities: Vec<Ability>,
) -> CardTemplate {
    CardTemplate {
        name: name.to_string(),
        display_asset: asset.to_string(),
        max_health,
        attack,
        defense: 0,
        speed: 0,
        abilities,
    }
}

pub static DEFAULT_PLAYER_DECK: Lazy<Vec<CardTemplate>> = Lazy::new(|| {
    vec![
        toy(
            "RoboWarrior",
            "🤖",
            120,
            25,
            vec![
                Ability::new("Laser Blast", TargetType::Enemy).damage(30).mana(3),
                Ability::new("Shield Generator", TargetType::Ally).shield(20).mana(2),
            ],
        ),
        toy(
            "T-Rex",
            "🦖",
            150,
            35,
            vec![
                Ability::new("Bite", TargetType::Enemy).damage(40).mana(4),
                Ability::new("Roar", TargetType::AllEnemies).damage(15).mana(2),
            ],
        ),
        toy(
            "Teddy",
            "🧸",
            100,
            20,
            vec![
                Ability::new("Cuddle", TargetType::Ally).heal(25).mana(2),
                Ability::new("Bear Hug", TargetType::Enemy)
                    .damage(20)
                    .freeze()
                    .mana(3),
            ],
        ),
        toy(
            "Rocket",
            "🚀",
            80,
            30,
            vec![
                Ability::new("Pyroblast", TargetType::Enemy).damage(50).mana(5),
                Ability::new("Boost", TargetType::Ally).heal(15).mana(1),
            ],
        ),
    ]
});

pub static DEFAULT_AI_DECK: Lazy<Vec<CardTemplate>> = Lazy::new(|| {
    vec![
        toy(
            "Alien",
            "👽",
            110,
            28,
            vec![
                Ability::new("Mind Control", TargetType::Enemy).damage(25).mana(3),
                Ability::new("Regenerate", TargetType::Ally).heal(20).mana(2),
            ],
        ),
        toy(
            "Dragon",
            "🐉",
            140,
            32,
            vec![
                Ability::new("Fire Breath", TargetType::Enemy).damage(35).mana(4),
                Ability::new("Dragon Scale", TargetType::Ally).shield(25).mana(3),
            ],
        ),
        toy(
            "Unicorn",
            "🦄",
            90,
            22,
            vec![
                Ability::new("Rainbow Heal", TargetType::Ally).heal(30).mana(3),
                Ability::new("Horn Strike", TargetType::Enemy).damage(25).mana(2),
            ],
        ),
        toy(
            "Ghost",
            "👻",
            95,
            26,
            vec![
                Ability::new("Haunt", TargetType::Enemy)
                    .damage(20)
                    .freeze()
                    .mana(3),
                Ability::new("Phase Shift", TargetType::Ally).shield(15).mana(2),
            ],
        ),
    ]
});

/// 좌석별 기본 덱. 0번 좌석은 플레이어 덱, 1번 좌석은 AI 덱을 받습니다.
pub fn default_deck_for(slot: PlayerSlot) -> &'static [CardTemplate] {
    match slot {
        PlayerSlot::Zero => &DEFAULT_PLAYER_DECK,
        PlayerSlot::One => &DEFAULT_AI_DECK,
    }
}
