mod create_position;
mod metrics;
mod withdraw_position;
