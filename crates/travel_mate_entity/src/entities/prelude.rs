pub use super::chat_message::Entity as ChatMessage;
pub use super::config_item::Entity as ConfigItem;
pub use super::packing_item::Entity as PackingItem;
pub use super::packing_list::Entity as PackingList;
pub use super::tip_item::Entity as TipItem;
pub use super::travel_tips::Entity as TravelTips;
pub use super::trip::Entity as Trip;
