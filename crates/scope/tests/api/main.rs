mod ingestion;
mod tides;
mod waves;
