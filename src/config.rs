pub mod pagination {
    pub const PRODUCTION_LIMIT: u32 = 10;
    pub const MEASURE_UNIT_LIMIT: u32 = 15;
    pub const GOAL_LIMIT: u32 = 10;
    pub const SALE_LIMIT: u32 = 10;
    pub const TRANSACTION_LIMIT: u32 = 10;
}

pub mod channels {
    pub const STORE_COMMANDS: usize = 32;
    pub const NOTIFICATIONS: usize = 64;
}
