//! Compiled-in pool of target words.

/// Common five-letter words offered to word-setters.
pub const TARGET_WORDS: &[&str] = &[
    "ABOUT", "ABOVE", "ACTOR", "ADOPT", "AGENT", "ALARM", "ALBUM", "ALERT", "ALIVE", "ALLOY",
    "ANGLE", "APPLE", "ARENA", "ARISE", "AVOID", "AWARD", "BACON", "BADGE", "BAKER", "BEACH",
    "BEGIN", "BENCH", "BLADE", "BLAME", "BLAST", "BLEND", "BLOOM", "BOARD", "BRAIN", "BRAVE",
    "BREAD", "BRICK", "BRUSH", "CABIN", "CANDY", "CARGO", "CHAIN", "CHALK", "CHARM", "CHASE",
    "CHEST", "CHIEF", "CLIMB", "CLOCK", "CLOUD", "COAST", "COUCH", "CRANE", "CREEK", "CROWN",
    "DAIRY", "DANCE", "DELTA", "DEPTH", "DOUGH", "DRAFT", "DREAM", "DRIFT", "EAGLE", "EARTH",
    "EMBER", "EQUAL", "EVENT", "FABLE", "FAITH", "FEAST", "FIELD", "FLAME", "FLASK", "FLOUR",
    "FOCUS", "FORGE", "FRAME", "FRESH", "FROST", "GHOST", "GIANT", "GLASS", "GLOBE", "GRAPE",
    "GRASS", "GUARD", "GUIDE", "HABIT", "HEART", "HONEY", "HOTEL", "HOUSE", "IVORY", "JEWEL",
    "JUICE", "KNIFE", "LASER", "LEMON", "LEVEL", "LIGHT", "LUNAR", "MAGIC", "MAPLE", "MARCH",
    "MEDAL", "MOUNT", "MUSIC", "NOBLE", "NORTH", "OCEAN", "OLIVE", "ORBIT", "PAINT", "PEACH",
    "PEARL", "PIANO", "PILOT", "PLANT", "PLAZA", "POUND", "PRISM", "QUEEN", "QUIET", "RADAR",
    "RAVEN", "RIVER", "ROBIN", "ROUTE", "SALAD", "SCALE", "SHADE", "SHELF", "SHORE", "SLATE",
    "SMILE", "SOLAR", "SPARK", "SPEED", "SPICE", "STAGE", "STONE", "STORM", "SUGAR", "SWIFT",
    "TABLE", "THEME", "TIGER", "TOAST", "TORCH", "TOWER", "TRAIL", "TRAIN", "ULTRA", "UNITY",
    "VALVE", "VAPOR", "VIVID", "VOICE", "WAGON", "WATER", "WHALE", "WHEAT", "WORLD", "YACHT",
    "YIELD", "ZEBRA",
];
