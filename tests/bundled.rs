use rusty_bunch::data::model::{DATA, DESCR, IMAGES, TARGET};
use rusty_bunch::{Bunch, Record, Resources, Value};

fn resources() -> Resources {
    Resources::bundled()
}

#[test]
fn iris_matches_known_layout() {
    let iris = resources().load_iris().unwrap();
    assert_eq!(iris.data.dim(), (150, 4));
    assert_eq!(iris.target.len(), 150);
    assert_eq!(iris.target_names, vec!["setosa", "versicolor", "virginica"]);
    assert_eq!(iris.class_counts(), vec![50, 50, 50]);

    // samples 10, 25 and 50
    assert_eq!(
        [iris.target[10], iris.target[25], iris.target[50]],
        [0, 0, 1]
    );
    assert_eq!(iris.data.row(0).to_vec(), vec![5.1, 3.5, 1.4, 0.2]);
    assert!(iris.descr.as_deref().unwrap().contains("Iris Plants Database"));
    assert!(iris.images().is_none());
}

#[test]
fn digits_images_alias_data() {
    let mut digits = resources().load_digits().unwrap();
    let n = digits.n_samples();
    assert!(n > 0);
    assert_eq!(digits.n_features(), 64);
    assert_eq!(digits.target_names.len(), 10);
    assert!(digits.target.iter().all(|&t| t < 10));
    assert_eq!(digits.images().unwrap().dim(), (n, 8, 8));
    assert!(digits.data.iter().all(|&v| (0.0..=16.0).contains(&v)));

    let original = digits.data[[3, 10]];
    assert_eq!(digits.images().unwrap()[[3, 1, 2]], original);

    digits.images_mut().unwrap()[[3, 1, 2]] = original + 100.0;
    assert_eq!(digits.data[[3, 10]], original + 100.0);

    digits.data[[0, 63]] = -5.0;
    let images = digits.get(IMAGES).unwrap().as_images().unwrap();
    assert_eq!(images[[0, 7, 7]], -5.0);
}

#[test]
fn trees_regression() {
    let trees = resources().load_trees().unwrap();
    assert_eq!(trees.data.dim(), (31, 2));
    assert_eq!(trees.target.len(), 31);
    assert!((trees.data[[0, 0]] - 8.3).abs() < 1e-9);
    assert!((trees.target[30] - 77.0).abs() < 1e-9);
    assert!(trees.descr.is_some());
}

#[test]
fn records_convert_to_bunch() {
    let iris = resources().load_iris().unwrap();
    let data = iris.data.clone();
    let bunch = Bunch::from(iris);

    assert_eq!(bunch[DATA], Value::Matrix(data));
    assert!(matches!(bunch[DESCR], Value::Text(_)));
    assert_eq!(bunch.get(TARGET).unwrap().as_labels().unwrap().len(), 150);
    assert!(!bunch.contains_key(IMAGES));
}
