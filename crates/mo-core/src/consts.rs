//! Core engine constants
//!
//! Values follow the classic Moria tables so that hunger, regeneration and
//! the other timed conditions pace the same way players expect.

/// Largest value a 16-bit counter may hold; `-MAX_SHORT` marks "rest as needed"
pub const MAX_SHORT: i32 = 32767;

/// Food levels
pub const PLAYER_FOOD_FULL: i32 = 10000;
pub const PLAYER_FOOD_MAX: i32 = 15000;
pub const PLAYER_FOOD_ALERT: i32 = 2000;
pub const PLAYER_FOOD_WEAK: i32 = 1000;
pub const PLAYER_FOOD_FAINT: i32 = 300;

/// Regeneration rates per hunger tier (16.16 fixed point fractions of max)
pub const PLAYER_REGEN_NORMAL: i32 = 197;
pub const PLAYER_REGEN_WEAK: i32 = 98;
pub const PLAYER_REGEN_FAINT: i32 = 33;
pub const PLAYER_REGEN_HPBASE: i32 = 1442;
pub const PLAYER_REGEN_MNBASE: i32 = 524;

/// Default amount of food burned per turn
pub const DEFAULT_FOOD_DIGESTED: i32 = 2;

/// Odds (1 in n) of a wandering monster appearing each turn
pub const MAX_MALLOC_CHANCE: u32 = 160;

/// Distance used when placing wandering monsters
pub const MAX_SIGHT: u32 = 20;

/// Stores turn their stock over on this period
pub const STORE_TURNAROUND: u64 = 1000;

/// Number of remembered messages
pub const MAX_SAVE_MSG: usize = 22;

/// Largest accepted repeat count
pub const MAX_REPEAT_COUNT: i32 = 99;

/// Input poll window while a repeat, rest or run is in progress
pub const INTERRUPT_POLL_MICROS: u64 = 10_000;

/// Random teleport distances
pub const RANDOM_TELEPORT_RANGE: u32 = 40;
pub const WIZARD_TELEPORT_RANGE: u32 = 100;

/// Deepest level reachable through the wizard level prompt
pub const MAX_WIZARD_DEPTH: i32 = 99;

/// Fuel a lamp can hold
pub const OBJ_LAMP_MAX: i32 = 15000;

/// Light fuel below which the "growing faint" warning may fire
pub const LIGHT_FAINT_THRESHOLD: i32 = 40;

/// Pack slots before the equipment list begins
pub const INVEN_PACK_SLOTS: usize = 22;

/// Object categories (tval)
pub const TV_NOTHING: u8 = 0;
pub const TV_MIN_ENCHANT: u8 = 10;
pub const TV_SPIKE: u8 = 13;
pub const TV_LIGHT: u8 = 15;
pub const TV_MAX_ENCHANT: u8 = 39;
pub const TV_FLASK: u8 = 77;
pub const TV_MAGIC_BOOK: u8 = 90;
pub const TV_PRAYER_BOOK: u8 = 91;

/// Light sources with this subval burn oil and can be refilled
pub const LAMP_SUBVAL: u16 = 0;

/// Enchantment detection probes every `ENCHANT_SCAN_MASK + 1` turns
pub const ENCHANT_SCAN_MASK: u64 = 0xF;

/// Per-item odds for the enchantment scan
pub const ENCHANT_CHANCE_PACK: u32 = 50;
pub const ENCHANT_CHANCE_WORN: u32 = 10;
