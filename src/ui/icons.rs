pub struct Icons;

impl Icons {
    pub const CHECK: &str = "✅";
    pub const CROSS: &str = "❌";
    pub const WARN: &str = "⚠️";
    pub const INFO: &str = "ℹ️";
    pub const STATS: &str = "📊";
    pub const PERSON: &str = "👤";
    pub const DATABASE: &str = "🗄️";
    pub const FILE: &str = "📄";
    pub const KEY: &str = "🔑";
    pub const BRIEFCASE: &str = "💼";
    pub const SCROLL: &str = "📜";
    pub const GEAR: &str = "⚙️";
    pub const DOOR: &str = "🚪";
}
