use crate::infra::{build_allocation_service, parse_date};
use chrono::{Local, NaiveDate};
use clap::Args;
use upae_alloc::allocation::{
    AllocationRequest, AllocationResult, Coordinates, GenderIdentity, PatientIntake,
    ScoredOffer, SeverityLevel, VulnerabilityLevel,
};
use upae_alloc::config::AppConfig;
use upae_alloc::error::AppError;

#[derive(Args, Debug)]
pub(crate) struct AllocateArgs {
    /// Requested specialty (e.g. Cardiologia)
    #[arg(long)]
    pub(crate) specialty: String,
    /// Patient name
    #[arg(long, default_value = "Paciente Demonstracao")]
    pub(crate) name: String,
    /// homem-cis, mulher-cis, homem-trans, mulher-trans or outro
    #[arg(long, default_value = "outro")]
    pub(crate) gender: GenderIdentity,
    #[arg(long, default_value_t = 45)]
    pub(crate) age: u16,
    /// Home municipality, used for geocoding and fares
    #[arg(long, default_value = "Recife")]
    pub(crate) municipality: String,
    #[arg(long, default_value = "")]
    pub(crate) address: String,
    /// Home latitude; skips geocoding when given with --lng
    #[arg(long, requires = "lng", allow_hyphen_values = true)]
    pub(crate) lat: Option<f64>,
    #[arg(long, requires = "lat", allow_hyphen_values = true)]
    pub(crate) lng: Option<f64>,
    #[arg(long)]
    pub(crate) urgent: bool,
    #[arg(long)]
    pub(crate) pregnant: bool,
    #[arg(long)]
    pub(crate) disability: bool,
    /// routine, moderate or urgent
    #[arg(long, default_value = "moderate")]
    pub(crate) severity: SeverityLevel,
    /// low, medium or high
    #[arg(long, default_value = "medium")]
    pub(crate) vulnerability: VulnerabilityLevel,
    /// Date the wait is counted from (YYYY-MM-DD). Defaults to today.
    #[arg(long, value_parser = parse_date)]
    pub(crate) reference_date: Option<NaiveDate>,
    /// Print the raw JSON result instead of the summary
    #[arg(long)]
    pub(crate) json: bool,
}

#[derive(Args, Debug)]
pub(crate) struct SpecialtiesArgs {
    #[arg(long)]
    pub(crate) gender: GenderIdentity,
    #[arg(long)]
    pub(crate) age: u16,
}

pub(crate) async fn run_allocation(args: AllocateArgs) -> Result<(), AppError> {
    let config = AppConfig::load()?;
    let service = build_allocation_service(&config.allocation)?;
    let json = args.json;
    let request = allocation_request(args);

    let result = service.allocate(request).await?;
    if json {
        match serde_json::to_string_pretty(&result) {
            Ok(payload) => println!("{payload}"),
            Err(err) => println!("Result unavailable as JSON: {err}"),
        }
    } else {
        render_allocation(&result);
    }
    Ok(())
}

pub(crate) fn run_specialties(args: SpecialtiesArgs) -> Result<(), AppError> {
    let config = AppConfig::load()?;
    let service = build_allocation_service(&config.allocation)?;
    let eligible = service.eligible_specialties(args.gender, args.age);

    println!(
        "Specialties open to {} aged {} ({} total)",
        args.gender,
        args.age,
        eligible.len()
    );
    println!("\nMedical");
    for name in &eligible.medical {
        println!("- {name}");
    }
    println!("\nMultidisciplinary");
    for name in &eligible.multidisciplinary {
        println!("- {name}");
    }
    Ok(())
}

fn allocation_request(args: AllocateArgs) -> AllocationRequest {
    let coordinates = match (args.lat, args.lng) {
        (Some(lat), Some(lng)) => Some(Coordinates::new(lat, lng)),
        _ => None,
    };
    let address = if args.address.trim().is_empty() {
        format!("{} - PE", args.municipality)
    } else {
        args.address
    };

    AllocationRequest {
        patient: PatientIntake {
            id: None,
            name: args.name,
            national_id: String::new(),
            gender: args.gender,
            age: args.age,
            specialty: args.specialty,
            address,
            municipality: args.municipality,
            coordinates,
            pregnant: args.pregnant,
            has_disability: args.disability,
            long_distance_eligible: false,
            urgent: args.urgent,
            severity: args.severity,
            vulnerability: args.vulnerability,
            condition: String::new(),
        },
        offers: None,
        reference_date: Some(
            args.reference_date
                .unwrap_or_else(|| Local::now().date_naive()),
        ),
    }
}

fn render_allocation(result: &AllocationResult) {
    let Some(best) = result.best() else {
        println!("No viable allocation ({} offers evaluated)", result.evaluated().len());
        for scored in result.evaluated() {
            println!("- {}", offer_line(scored));
            if let Some(reason) = scored.failure_reason() {
                println!("    {reason}");
            }
        }
        return;
    };

    println!("Recommended: {}", offer_line(best));
    if let Some(explanation) = result.explanation() {
        println!("\n{}", explanation.title);
        println!("{}", explanation.summary);
        for factor in &explanation.factors {
            println!("- [{:?}] {}", factor.tone, factor.text);
        }
        if let Some(comparison) = &explanation.comparison {
            println!(
                "  {} | {} | wait {} | {} | no-show risk {}",
                comparison.distance,
                comparison.travel_time,
                comparison.wait,
                comparison.cost,
                comparison.no_show_risk
            );
            if let Some(date) = comparison.expected_date {
                println!("  Expected appointment: {date}");
            }
        }
        let weights = &explanation.transparency;
        println!(
            "  Weights: distance {} | wait {} | cost {} | transport {}",
            weights.distance, weights.wait, weights.cost, weights.transport
        );
    }

    if result.alternatives().is_empty() {
        println!("\nAlternatives: none");
    } else {
        println!("\nAlternatives");
        for alternative in result.alternatives() {
            println!("- {}", offer_line(alternative));
        }
    }
}

fn offer_line(scored: &ScoredOffer) -> String {
    let offer = scored.offer();
    format!(
        "{} ({}) score {:.3}",
        offer.facility_name,
        offer.municipality,
        scored.score()
    )
}
