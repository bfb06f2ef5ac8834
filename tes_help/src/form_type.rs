use std::fmt;

use serde::Deserialize;

macro_rules! form_types {
    ($($variant:ident => $code:literal,)+) => {
        /// Form types known to the engine, in engine enumeration order.
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Deserialize)]
        #[serde(try_from = "String")]
        pub enum FormType {
            $($variant,)+
        }

        impl FormType {
            pub const ALL: &'static [FormType] = &[$(FormType::$variant,)+];

            /// Four-character record code (`NPC_`, `WEAP`, ...).
            pub fn code(self) -> &'static str {
                match self {
                    $(FormType::$variant => $code,)+
                }
            }
        }
    };
}

form_types! {
    PluginInfo => "TES4",
    FormGroup => "GRUP",
    GameSetting => "GMST",
    Keyword => "KYWD",
    LocationRefType => "LCRT",
    Action => "AACT",
    TextureSet => "TXST",
    MenuIcon => "MICN",
    Global => "GLOB",
    Class => "CLAS",
    Faction => "FACT",
    HeadPart => "HDPT",
    Eyes => "EYES",
    Race => "RACE",
    Sound => "SOUN",
    AcousticSpace => "ASPC",
    Skill => "SKIL",
    MagicEffect => "MGEF",
    Script => "SCPT",
    LandTexture => "LTEX",
    Enchantment => "ENCH",
    Spell => "SPEL",
    Scroll => "SCRL",
    Activator => "ACTI",
    TalkingActivator => "TACT",
    Armor => "ARMO",
    Book => "BOOK",
    Container => "CONT",
    Door => "DOOR",
    Ingredient => "INGR",
    Light => "LIGH",
    Misc => "MISC",
    Apparatus => "APPA",
    Static => "STAT",
    StaticCollection => "SCOL",
    MovableStatic => "MSTT",
    Grass => "GRAS",
    Tree => "TREE",
    Flora => "FLOR",
    Furniture => "FURN",
    Weapon => "WEAP",
    Ammo => "AMMO",
    Npc => "NPC_",
    LeveledNpc => "LVLN",
    KeyMaster => "KEYM",
    AlchemyItem => "ALCH",
    IdleMarker => "IDLM",
    Note => "NOTE",
    ConstructibleObject => "COBJ",
    Projectile => "PROJ",
    Hazard => "HAZD",
    SoulGem => "SLGM",
    LeveledItem => "LVLI",
    Weather => "WTHR",
    Climate => "CLMT",
    ShaderParticleGeometryData => "SPGD",
    ReferenceEffect => "RFCT",
    Region => "REGN",
    Navigation => "NAVI",
    Cell => "CELL",
    Reference => "REFR",
    ActorCharacter => "ACHR",
    ProjectileMissile => "PMIS",
    ProjectileArrow => "PARW",
    ProjectileGrenade => "PGRE",
    ProjectileBeam => "PBEA",
    ProjectileFlame => "PFLA",
    ProjectileCone => "PCON",
    ProjectileBarrier => "PBAR",
    PlacedHazard => "PHZD",
    WorldSpace => "WRLD",
    Land => "LAND",
    NavMesh => "NAVM",
    Tlod => "TLOD",
    Dialogue => "DIAL",
    Info => "INFO",
    Quest => "QUST",
    Idle => "IDLE",
    Package => "PACK",
    CombatStyle => "CSTY",
    LoadScreen => "LSCR",
    LeveledSpell => "LVSP",
    AnimatedObject => "ANIO",
    Water => "WATR",
    EffectShader => "EFSH",
    Toft => "TOFT",
    Explosion => "EXPL",
    Debris => "DEBR",
    ImageSpace => "IMGS",
    ImageAdapter => "IMAD",
    FormList => "FLST",
    Perk => "PERK",
    BodyPartData => "BPTD",
    AddonNode => "ADDN",
    ActorValueInfo => "AVIF",
    CameraShot => "CAMS",
    CameraPath => "CPTH",
    VoiceType => "VTYP",
    MaterialType => "MATT",
    Impact => "IPCT",
    ImpactDataSet => "IPDS",
    Armature => "ARMA",
    EncounterZone => "ECZN",
    Location => "LCTN",
    Message => "MESG",
    Ragdoll => "RGDL",
    DefaultObject => "DOBJ",
    LightingMaster => "LGTM",
    MusicType => "MUSC",
    Footstep => "FSTP",
    FootstepSet => "FSTS",
    StoryManagerBranchNode => "SMBN",
    StoryManagerQuestNode => "SMQN",
    StoryManagerEventNode => "SMEN",
    DialogueBranch => "DLBR",
    MusicTrack => "MUST",
    DialogueView => "DLVW",
    WordOfPower => "WOOP",
    Shout => "SHOU",
    EquipSlot => "EQUP",
    Relationship => "RELA",
    Scene => "SCEN",
    AssociationType => "ASTP",
    Outfit => "OTFT",
    ArtObject => "ARTO",
    MaterialObject => "MATO",
    MovementType => "MOVT",
    SoundRecord => "SNDR",
    DualCastData => "DUAL",
    SoundCategory => "SNCT",
    SoundOutputModel => "SOPM",
    CollisionLayer => "COLL",
    ColorForm => "CLFM",
    ReverbParam => "REVB",
    LensFlare => "LENS",
    LensSprite => "LSPR",
    VolumetricLighting => "VOLI",
}

impl FormType {
    /// Parse a console type parameter.
    ///
    /// Matching ignores ASCII case. Empty input, `NONE` and unknown codes all
    /// mean "no type filter".
    pub fn parse(code: &str) -> Option<FormType> {
        let code = code.trim();
        FormType::ALL
            .iter()
            .copied()
            .find(|ty| ty.code().eq_ignore_ascii_case(code))
    }

    /// Sort key for the type: the code read as a big-endian integer, which
    /// orders types by their code text.
    pub fn sort_code(self) -> u32 {
        let bytes = self.code().as_bytes();
        u32::from_be_bytes([bytes[0], bytes[1], bytes[2], bytes[3]])
    }

    /// Types whose records carry their editor ID in memory.
    pub fn stores_editor_id(self) -> bool {
        matches!(
            self,
            FormType::Keyword
                | FormType::LocationRefType
                | FormType::Action
                | FormType::MenuIcon
                | FormType::Global
                | FormType::HeadPart
                | FormType::Race
                | FormType::Sound
                | FormType::Script
                | FormType::Navigation
                | FormType::Cell
                | FormType::WorldSpace
                | FormType::Land
                | FormType::NavMesh
                | FormType::Dialogue
                | FormType::Quest
                | FormType::Idle
                | FormType::AnimatedObject
                | FormType::ImageAdapter
                | FormType::VoiceType
                | FormType::Ragdoll
                | FormType::DefaultObject
                | FormType::MusicType
                | FormType::StoryManagerBranchNode
                | FormType::StoryManagerQuestNode
                | FormType::StoryManagerEventNode
                | FormType::SoundRecord
        )
    }
}

impl fmt::Display for FormType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl TryFrom<String> for FormType {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        FormType::parse(&value).ok_or_else(|| format!("unknown form type '{value}'"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_codes_case_insensitively() {
        assert_eq!(FormType::parse("CELL"), Some(FormType::Cell));
        assert_eq!(FormType::parse("npc_"), Some(FormType::Npc));
        assert_eq!(FormType::parse(" weap "), Some(FormType::Weapon));
        assert_eq!(FormType::parse("NONE"), None);
        assert_eq!(FormType::parse(""), None);
    }

    #[test]
    fn codes_are_four_characters_and_unique() {
        let mut seen = std::collections::HashSet::new();
        for ty in FormType::ALL {
            assert_eq!(ty.code().len(), 4, "{ty:?}");
            assert!(seen.insert(ty.code()), "duplicate code {}", ty.code());
        }
    }

    #[test]
    fn sort_code_follows_code_text() {
        assert!(FormType::Armor.sort_code() < FormType::Book.sort_code());
        assert!(FormType::Cell.sort_code() < FormType::Keyword.sort_code());
        assert!(FormType::Npc.sort_code() < FormType::Weapon.sort_code());
    }
}
