mod csv_input;
pub mod prices;
pub mod rates;
pub mod sentiment;

pub use prices::{
    combine_instrument_series, load_instrument_prices, load_onehot_prices, read_instrument_prices,
    read_onehot_prices, write_onehot_prices,
};
pub use rates::{
    derive_rate_changes, load_announcement_dates, load_rate_levels, load_rates, read_announcement_dates,
    read_rate_levels, read_rates,
};
pub use sentiment::{load_sentiment, read_sentiment};
