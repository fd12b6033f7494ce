mod accumulators;
mod cycle;
mod dedup;
mod round_trip;
mod version_skew;
mod wire;
