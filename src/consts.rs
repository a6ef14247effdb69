pub mod db_const {
    pub const OPPORTUNITY_TABLE: &str = "opportunities";
    pub const APPLICATION_TABLE: &str = "applications";
    pub const UNIQUE_APPLICATION_INDEX: &str = "unique_applicant_per_post";
    pub const DEADLINE_INDEX: &str = "opportunity_deadline";
}

pub mod auth_const {
    pub const TOKEN_COOKIE: &str = "token";
}

pub mod listing_const {
    pub const UPCOMING_LIMIT: u32 = 6;
    // a post with this many slots left (or fewer) takes no more applicants
    pub const MIN_OPEN_SLOTS: i64 = 1;
}
