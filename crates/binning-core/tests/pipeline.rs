//! End-to-end binning runs: configuration, spatial passes, temporal
//! composites and interpretation.

use std::sync::Arc;

use binning_core::planetary_grid::{GeoBoundingBox, GridDefinition, Region};
use binning_core::{
    BinningConfig, DataPeriod, DataPeriodMembership, Observation, SpatialBinner, TemporalBinner,
};
use test_utils::{
    assert_approx_eq, bbox, bin_center_observations, configs, init_test_tracing,
    plate_carree_context, point_observations, random_swath, raster_swath, time,
};

#[test]
fn test_every_bin_receives_its_own_observation() {
    init_test_tracing();
    let context = Arc::new(plate_carree_context(36, "MIN_MAX", None, &["id"]));
    let observations = bin_center_observations(context.grid().as_ref(), 0.0);

    let mut binner = SpatialBinner::new(context.clone());
    binner.process_parallel(&observations);
    let (bins, stats) = binner.complete();

    assert_eq!(stats.bins as u64, context.grid().num_bins());
    for bin in &bins {
        assert_eq!(bin.num_obs, 1);
        assert_eq!(bin.features, vec![bin.index as f64, bin.index as f64, 1.0]);
    }
}

#[test]
fn test_global_raster_fills_every_bin_once() {
    let context = Arc::new(plate_carree_context(18, "AME", None, &["v"]));
    let observations = raster_swath(bbox::GLOBAL, 36, 18, 1, 0.0);

    let mut binner = SpatialBinner::new(context.clone());
    binner.process_parallel(&observations);
    let (bins, stats) = binner.complete();

    assert_eq!(bins.len() as u64, context.grid().num_bins());
    assert_eq!(stats.observations_rejected, 0);
    assert!(bins.iter().all(|b| b.num_obs == 1));
}

#[test]
fn test_daily_composite_from_yaml() {
    init_test_tracing();
    let config = BinningConfig::from_yaml_str(configs::DAILY_YAML).unwrap();
    let context = Arc::new(config.create_binning_context().unwrap());
    assert_eq!(
        context.bin_manager().interpreted_feature_names()[..5],
        ["chl_mean", "chl_sigma", "chl_median", "chl_mode", "chl_count"]
    );

    // two passes over the North Sea, the second one a day late
    let overpass = time::REFERENCE_MJD + 0.25;
    let on_time = raster_swath(bbox::NORTH_SEA, 26, 20, 2, overpass);
    let late = raster_swath(bbox::NORTH_SEA, 26, 20, 2, overpass + 1.0);

    let mut composite = TemporalBinner::new(context.clone());
    for pass in [&on_time, &late] {
        let mut binner = SpatialBinner::new(context.clone());
        binner.process_parallel(pass);
        let (bins, _) = binner.complete();
        composite.add_pass(&bins);
    }

    assert_eq!(composite.num_passes(), 2);
    let output = composite.interpret_all();
    assert!(!output.is_empty());
    assert!(output.windows(2).all(|w| w[0].index < w[1].index));
    assert_eq!(output.iter().map(|b| b.num_obs as usize).sum::<usize>(), on_time.len());
    assert!(output.iter().all(|b| b.num_passes == 1));
}

#[test]
fn test_observations_outside_period_are_counted_not_binned() {
    let period = DataPeriod::new(time::REFERENCE_MJD, 1.0, 0.0).unwrap();
    let context = Arc::new(
        plate_carree_context(180, "AME", None, &["chl"]).with_data_period(period),
    );

    let observations = random_swath(9, 2_000, 1, time::REFERENCE_MJD - 1.0, (0.0, 1.0))
        .into_iter()
        .chain(random_swath(10, 2_000, 1, time::REFERENCE_MJD, (0.0, 1.0)))
        .collect::<Vec<Observation>>();
    let expected_current = observations
        .iter()
        .filter(|o| period.membership(o.lon, o.time) == DataPeriodMembership::CurrentPeriod)
        .count() as u64;

    let mut binner = SpatialBinner::new(context);
    binner.process_parallel(&observations);
    let (bins, stats) = binner.complete();

    assert_eq!(stats.observations_seen, 4_000);
    assert_eq!(stats.observations_accepted, expected_current);
    assert_eq!(stats.observations_accepted + stats.observations_rejected, 4_000);
    let binned: u64 = bins.iter().map(|b| b.num_obs).sum();
    assert_eq!(binned, expected_current);
}

#[test]
fn test_swath_across_date_line_stays_in_one_data_day() {
    let period = DataPeriod::new(0.0, 1.0, 0.0).unwrap();
    // local time advances westward: east of the line the same data day
    // started almost a full day earlier in UTC
    assert_eq!(period.membership(-179.9, 0.01), DataPeriodMembership::CurrentPeriod);
    assert_eq!(period.membership(179.9, -0.99), DataPeriodMembership::CurrentPeriod);
    assert_eq!(period.membership(179.9, 0.01), DataPeriodMembership::SubsequentPeriods);
    assert_eq!(period.membership(-179.9, -0.01), DataPeriodMembership::PreviousPeriods);
}

#[test]
fn test_date_line_swaths_share_a_data_day() {
    let period = DataPeriod::new(time::REFERENCE_MJD, 1.0, 0.0).unwrap();
    let context = Arc::new(
        plate_carree_context(180, "MIN_MAX", None, &["v"]).with_data_period(period),
    );

    // the eastern strip is overflown half a day earlier in UTC
    let west = raster_swath(bbox::DATE_LINE_WEST, 10, 60, 1, time::REFERENCE_MJD + 0.5);
    let east = raster_swath(bbox::DATE_LINE_EAST, 10, 60, 1, time::REFERENCE_MJD - 0.5);
    let east_late = raster_swath(bbox::DATE_LINE_EAST, 10, 60, 1, time::REFERENCE_MJD + 0.5);

    let mut composite = TemporalBinner::new(context.clone());
    let mut rejected = 0;
    for pass in [&west, &east, &east_late] {
        let mut binner = SpatialBinner::new(context.clone());
        binner.process_parallel(pass);
        let (bins, stats) = binner.complete();
        rejected += stats.observations_rejected;
        composite.add_pass(&bins);
    }

    assert_eq!(rejected, east_late.len() as u64);
    let output = composite.interpret_all();
    let binned: u64 = output.iter().map(|b| b.num_obs).sum();
    assert_eq!(binned, (west.len() + east.len()) as u64);
    assert!(output.iter().any(|b| context.grid().center_lat_lon(b.index).unwrap().1 < 0.0));
    assert!(output.iter().any(|b| context.grid().center_lat_lon(b.index).unwrap().1 > 0.0));
}

#[test]
fn test_product_date_range_limits_binning() {
    let config = BinningConfig::from_yaml_str(&format!(
        "grid: {{type: plate_carree, num_rows: 90}}\n\
         variables: [{{name: chl}}]\n\
         start_date: \"{date}\"\n\
         end_date: \"{date}\"\n",
        date = time::REFERENCE_DATE
    ))
    .unwrap();
    let context = Arc::new(config.create_binning_context().unwrap());

    let in_range = raster_swath(bbox::MEDITERRANEAN, 12, 8, 1, time::REFERENCE_MJD + 0.5);
    let next_day = raster_swath(bbox::MEDITERRANEAN, 12, 8, 1, time::REFERENCE_MJD + 1.0);
    let years_later = point_observations(40.0, 10.0, 62_502.0, &[1.0]);

    let mut binner = SpatialBinner::new(context);
    binner.process_observations(in_range.iter().chain(&next_day));
    assert!(!binner.process_observation(&years_later[0]));
    let (bins, stats) = binner.complete();

    assert_eq!(stats.observations_accepted, in_range.len() as u64);
    assert_eq!(stats.observations_rejected, next_day.len() as u64 + 1);
    let binned: u64 = bins.iter().map(|b| b.num_obs).sum();
    assert_eq!(binned, in_range.len() as u64);
}

#[test]
fn test_region_limits_binning() {
    let (min_lon, min_lat, max_lon, max_lat) = bbox::MEDITERRANEAN;
    let region = Region::from_bbox(GeoBoundingBox::new(min_lon, min_lat, max_lon, max_lat));
    let mut config = BinningConfig::with_variables(&["sst"]);
    config.grid = GridDefinition::PlateCarree { num_rows: 180 };
    config.region = Some(region.clone());
    let context = Arc::new(config.create_binning_context().unwrap());

    let inside = raster_swath(bbox::MEDITERRANEAN, 21, 8, 1, 0.0);
    let arctic = raster_swath(bbox::ARCTIC, 36, 5, 1, 0.0);
    let global = raster_swath(bbox::GLOBAL, 72, 36, 1, 0.0);
    let expected_global = global.iter().filter(|o| region.contains(o.lon, o.lat)).count() as u64;
    assert!(expected_global > 0);

    for (pass, expected) in [
        (&inside, inside.len() as u64),
        (&arctic, 0),
        (&global, expected_global),
    ] {
        let mut binner = SpatialBinner::new(context.clone());
        binner.process_parallel(pass);
        let (bins, stats) = binner.complete();
        assert_eq!(stats.observations_accepted, expected);
        assert_eq!(stats.observations_rejected, pass.len() as u64 - expected);
        assert!(bins.iter().all(|b| {
            let (lat, lon) = context.grid().center_lat_lon(b.index).unwrap();
            (min_lat..=max_lat).contains(&lat) && (min_lon..=max_lon).contains(&lon)
        }));
    }
}

#[test]
fn test_weight_coefficient_controls_pass_weighting() {
    let point = |values: &[f64]| point_observations(10.0, 10.0, 0.0, values);
    let big_pass = point(&[1.0, 1.0, 1.0, 1.0, 1.0, 1.0, 1.0, 1.0, 1.0]);
    let small_pass = point(&[10.0]);

    let mean_for = |coeff: &str| {
        let context = Arc::new(plate_carree_context(18, "AME", Some(coeff), &["v"]));
        let mut composite = TemporalBinner::new(context.clone());
        for pass in [&big_pass, &small_pass] {
            let mut binner = SpatialBinner::new(context.clone());
            binner.process_observations(pass);
            composite.add_pass(&binner.complete().0);
        }
        composite.interpret_all()[0].values[0]
    };

    // every observation counts equally
    assert_approx_eq!(mean_for("1"), 19.0 / 10.0, 1e-12);
    // every pass counts equally
    assert_approx_eq!(mean_for("0"), 5.5, 1e-12);
    // sqrt weighting sits in between: (9/3 + 10) / (3 + 1)
    assert_approx_eq!(mean_for("0.5"), 13.0 / 4.0, 1e-12);
}

#[test]
fn test_merging_composites_equals_adding_all_passes() {
    let context = Arc::new(plate_carree_context(90, "AME", Some("0.5"), &["a", "b"]));
    let passes: Vec<_> = (0..4)
        .map(|seed| {
            let mut binner = SpatialBinner::new(context.clone());
            binner.process_parallel(&random_swath(seed, 3_000, 2, 0.0, (0.0, 10.0)));
            binner.complete().0
        })
        .collect();

    let mut all = TemporalBinner::new(context.clone());
    for pass in &passes {
        all.add_pass(pass);
    }

    let mut first = TemporalBinner::new(context.clone());
    first.add_pass(&passes[0]);
    first.add_pass(&passes[1]);
    let mut second = TemporalBinner::new(context.clone());
    second.add_pass(&passes[2]);
    second.add_pass(&passes[3]);
    first.merge(&second);

    assert_eq!(first.num_passes(), all.num_passes());
    assert_eq!(first.len(), all.len());
    for (x, y) in first.interpret_all().iter().zip(all.interpret_all().iter()) {
        assert_eq!(x.index, y.index);
        assert_eq!(x.num_obs, y.num_obs);
        assert_eq!(x.num_passes, y.num_passes);
        for (u, v) in x.values.iter().zip(&y.values) {
            assert_approx_eq!(*u, *v, 1e-9);
        }
    }
}

#[test]
fn test_gaussian_grid_from_json() {
    let config = BinningConfig::from_json_str(configs::MIN_MAX_JSON).unwrap();
    let context = Arc::new(config.create_binning_context().unwrap());
    assert_eq!(context.grid().name(), "reduced_gaussian");

    let mut binner = SpatialBinner::new(context.clone());
    binner.process_observations(&point_observations(-33.9, 18.4, 0.0, &[14.0, 17.5, 16.0]));
    let (bins, _) = binner.complete();
    assert_eq!(bins.len(), 1);
    assert_eq!(bins[0].index, context.bin_index(-33.9, 18.4));
    assert_eq!(bins[0].features, vec![14.0, 17.5, 3.0]);
}
