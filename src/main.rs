//! `bondwire`: wires the full service/listener graph and drives it over
//! `./input/*.txt`, in the order prices -> marketdata -> trades -> inquiries.

use bondwire_core::{io, Connector, Forward, PipelineError, Service};
use bondwire_data::{MarketDataConnector, MarketDataService, PricingConnector, PricingService};
use bondwire_execution::{
    AlgoExecutionService, ExecutionService, TradeBookingConnector, TradeBookingService,
};
use bondwire_inquiry::{InquiryConnector, InquiryService};
use bondwire_risk::{BucketedSector, PositionService, RiskService};
use bondwire_sinks::{
    GuiService, HistoricalDataService, EXECUTIONS_FILE, GUI_FILE, INQUIRIES_FILE, POSITIONS_FILE,
    RISK_FILE, STREAMING_FILE,
};
use bondwire_streaming::{AlgoStreamingService, StreamingService};
use std::cell::RefCell;
use std::path::Path;
use std::rc::Rc;

const INPUT_DIR: &str = "./input";
const OUTPUT_DIR: &str = ".";

fn main() {
    bondwire_core::logging::init_logging();

    if let Err(err) = run(Path::new(INPUT_DIR), Path::new(OUTPUT_DIR)) {
        tracing::error!(%err, "bondwire pipeline aborted");
        std::process::exit(1);
    }
}

fn run(input_dir: &Path, output_dir: &Path) -> Result<(), PipelineError> {
    tracing::info!("Initialize all services");
    let pricing = Rc::new(RefCell::new(PricingService::new()));
    let algo_streaming = Rc::new(RefCell::new(AlgoStreamingService::new()));
    let streaming = Rc::new(RefCell::new(StreamingService::new()));
    let market_data = Rc::new(RefCell::new(MarketDataService::new()));
    let algo_execution = Rc::new(RefCell::new(AlgoExecutionService::new()));
    let execution = Rc::new(RefCell::new(ExecutionService::new()));
    let trade_booking = Rc::new(RefCell::new(TradeBookingService::new()));
    let position = Rc::new(RefCell::new(PositionService::new()));
    let risk = Rc::new(RefCell::new(RiskService::new()));
    let inquiry = Rc::new(RefCell::new(InquiryService::new()));

    tracing::info!("Initialize all listeners");
    // Pricing -> AlgoStreaming -> Streaming -> HistStreaming, and Pricing -> GUI.
    pricing
        .borrow_mut()
        .add_listener(Box::new(Forward::new(algo_streaming.clone())));
    pricing
        .borrow_mut()
        .add_listener(Box::new(GuiService::new(output_dir.join(GUI_FILE))));
    algo_streaming
        .borrow_mut()
        .add_listener(Box::new(Forward::new(streaming.clone())));
    streaming
        .borrow_mut()
        .add_listener(Box::new(HistoricalDataService::new(output_dir.join(STREAMING_FILE))));

    // MarketData -> AlgoExecution -> Execution -> (HistExecution, TradeBooking back-edge).
    market_data
        .borrow_mut()
        .add_listener(Box::new(Forward::new(algo_execution.clone())));
    algo_execution
        .borrow_mut()
        .add_listener(Box::new(Forward::new(execution.clone())));
    execution
        .borrow_mut()
        .add_listener(Box::new(Forward::new(trade_booking.clone())));
    execution
        .borrow_mut()
        .add_listener(Box::new(HistoricalDataService::new(output_dir.join(EXECUTIONS_FILE))));

    // TradeBooking -> Position -> (Risk, HistPosition), Risk -> HistRisk.
    trade_booking
        .borrow_mut()
        .add_listener(Box::new(Forward::new(position.clone())));
    position
        .borrow_mut()
        .add_listener(Box::new(Forward::new(risk.clone())));
    position
        .borrow_mut()
        .add_listener(Box::new(HistoricalDataService::new(output_dir.join(POSITIONS_FILE))));
    risk.borrow_mut()
        .add_listener(Box::new(HistoricalDataService::new(output_dir.join(RISK_FILE))));

    // Inquiry -> HistInquiry.
    inquiry
        .borrow_mut()
        .add_listener(Box::new(HistoricalDataService::new(output_dir.join(INQUIRIES_FILE))));

    tracing::info!("Test the trading system");

    tracing::info!("reading prices.txt");
    let mut lines = io::read_lines(input_dir.join("prices.txt"))?.into_iter();
    PricingConnector::new(pricing.clone()).subscribe(&mut lines)?;

    tracing::info!("reading marketdata.txt");
    let mut lines = io::read_lines(input_dir.join("marketdata.txt"))?.into_iter();
    MarketDataConnector::new(market_data.clone()).subscribe(&mut lines)?;

    tracing::info!("reading trades.txt");
    let mut lines = io::read_lines(input_dir.join("trades.txt"))?.into_iter();
    TradeBookingConnector::new(trade_booking.clone()).subscribe(&mut lines)?;

    tracing::info!("reading inquiries.txt");
    let mut lines = io::read_lines(input_dir.join("inquiries.txt"))?.into_iter();
    InquiryConnector::new(inquiry.clone()).subscribe(&mut lines)?;

    // Demonstrate the bucketed-risk roll-up across the belly of the curve now that
    // every trade has been booked.
    let belly = BucketedSector::new(
        "BELLY",
        vec![
            "91282CAZ4".to_string(), // US5Y
            "91282CAY7".to_string(), // US7Y
            "91282CAV3".to_string(), // US10Y
        ],
    );
    let bucketed = risk.borrow().bucketed_risk(&belly);
    tracing::info!(
        sector = %bucketed.product_id,
        pv01 = %bucketed.pv01,
        quantity = bucketed.quantity,
        "bucketed risk"
    );

    tracing::info!("inquiries drained, shutting down cleanly");
    Ok(())
}
