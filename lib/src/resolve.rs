mod address;
mod jump;

pub use self::address::AddressResolver;
pub use self::address::ResolvedTarget;
pub use self::jump::pick_jump_host;
