pub mod price_list;
pub mod repository;

pub use price_list::{PriceList, PriceListError};
pub use repository::{NewPriceList, PriceListRepository, PriceListUpdate};
